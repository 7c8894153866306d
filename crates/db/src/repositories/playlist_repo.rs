//! Repository for the `playlists` and `playlist_items` tables.

use sqlx::PgPool;

use beamview_core::error::CoreError;
use beamview_core::store::PlaylistItem;
use beamview_core::types::DbId;
use beamview_core::version::compute_version;

use crate::models::playlist::{PlaylistItemRow, PlaylistRow};

/// Column list for `playlists` queries.
const COLUMNS: &str = "id, customer_id, name, is_default, content_version, created_at, updated_at";

/// Column list for `playlist_items` queries.
const ITEM_COLUMNS: &str = "id, playlist_id, kind, src, duration_secs, sort, checksum";

/// Provides access to playlists and their items.
pub struct PlaylistRepo;

impl PlaylistRepo {
    pub async fn find_by_id(
        pool: &PgPool,
        playlist_id: DbId,
    ) -> Result<Option<PlaylistRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM playlists WHERE id = $1");
        sqlx::query_as::<_, PlaylistRow>(&query)
            .bind(playlist_id)
            .fetch_optional(pool)
            .await
    }

    /// The tenant's default playlist, if any. The write path keeps at most
    /// one `is_default = true` row per customer.
    pub async fn find_default(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Option<PlaylistRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM playlists WHERE customer_id = $1 AND is_default");
        sqlx::query_as::<_, PlaylistRow>(&query)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }

    /// Items of a playlist in display order.
    pub async fn list_items_ordered(
        pool: &PgPool,
        playlist_id: DbId,
    ) -> Result<Vec<PlaylistItemRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM playlist_items \
             WHERE playlist_id = $1 \
             ORDER BY sort ASC, id ASC"
        );
        sqlx::query_as::<_, PlaylistItemRow>(&query)
            .bind(playlist_id)
            .fetch_all(pool)
            .await
    }

    /// Create a playlist. New playlists start with the empty-version
    /// sentinel since they have no items yet.
    pub async fn create(
        pool: &PgPool,
        customer_id: DbId,
        name: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO playlists (customer_id, name, is_default, content_version) \
             VALUES ($1, $2, false, $3) \
             RETURNING id",
        )
        .bind(customer_id)
        .bind(name)
        .bind(beamview_core::version::EMPTY_VERSION)
        .fetch_one(pool)
        .await
    }

    /// Delete a playlist (items cascade). Returns the deleted row so the
    /// caller can tell whether the tenant just lost its default.
    pub async fn delete(
        pool: &PgPool,
        playlist_id: DbId,
    ) -> Result<Option<PlaylistRow>, sqlx::Error> {
        let query = format!("DELETE FROM playlists WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, PlaylistRow>(&query)
            .bind(playlist_id)
            .fetch_optional(pool)
            .await
    }

    /// Make `playlist_id` the tenant's sole default.
    ///
    /// Unset-then-set inside one transaction: concurrent setters serialize
    /// on the row updates, so the one-default invariant holds without a
    /// per-tenant lock. Returns `false` when the playlist does not belong
    /// to the customer (nothing is changed in that case).
    pub async fn set_default(
        pool: &PgPool,
        customer_id: DbId,
        playlist_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE playlists SET is_default = true, updated_at = NOW() \
             WHERE id = $1 AND customer_id = $2",
        )
        .bind(playlist_id)
        .bind(customer_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE playlists SET is_default = false, updated_at = NOW() \
             WHERE customer_id = $1 AND id <> $2 AND is_default",
        )
        .bind(customer_id)
        .bind(playlist_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Recompute and persist the content version from the current item set.
    ///
    /// Idempotent: a no-op write followed by a refresh yields the same
    /// version string.
    pub async fn refresh_version(pool: &PgPool, playlist_id: DbId) -> Result<String, CoreError> {
        let rows = Self::list_items_ordered(pool, playlist_id)
            .await
            .map_err(db_err)?;
        let items: Vec<PlaylistItem> = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;

        let version = compute_version(&items);
        sqlx::query(
            "UPDATE playlists SET content_version = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(playlist_id)
        .bind(&version)
        .execute(pool)
        .await
        .map_err(db_err)?;

        Ok(version)
    }

    /// Append an item. When `sort` is `None` the item lands after the
    /// current maximum.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_item(
        pool: &PgPool,
        playlist_id: DbId,
        kind: &str,
        src: &str,
        duration_secs: i32,
        sort: Option<i32>,
        checksum: Option<&str>,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO playlist_items (playlist_id, kind, src, duration_secs, sort, checksum) \
             VALUES ($1, $2, $3, $4, \
                     COALESCE($5, (SELECT COALESCE(MAX(sort), 0) + 1 \
                                   FROM playlist_items WHERE playlist_id = $1)), \
                     $6) \
             RETURNING id",
        )
        .bind(playlist_id)
        .bind(kind)
        .bind(src)
        .bind(duration_secs)
        .bind(sort)
        .bind(checksum)
        .fetch_one(pool)
        .await
    }

    /// Partially update an item; `None` fields keep their current value.
    /// Note this makes `checksum` replaceable but never clearable here —
    /// dropping a checksum requires re-creating the item. Returns `false`
    /// when the item is not part of the playlist.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_item(
        pool: &PgPool,
        playlist_id: DbId,
        item_id: DbId,
        kind: Option<&str>,
        src: Option<&str>,
        duration_secs: Option<i32>,
        sort: Option<i32>,
        checksum: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE playlist_items SET \
                 kind = COALESCE($3, kind), \
                 src = COALESCE($4, src), \
                 duration_secs = COALESCE($5, duration_secs), \
                 sort = COALESCE($6, sort), \
                 checksum = COALESCE($7, checksum) \
             WHERE id = $2 AND playlist_id = $1",
        )
        .bind(playlist_id)
        .bind(item_id)
        .bind(kind)
        .bind(src)
        .bind(duration_secs)
        .bind(sort)
        .bind(checksum)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an item from the playlist. Returns `false` when the item is
    /// not part of the playlist.
    pub async fn delete_item(
        pool: &PgPool,
        playlist_id: DbId,
        item_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM playlist_items WHERE id = $2 AND playlist_id = $1")
            .bind(playlist_id)
            .bind(item_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply new sort positions. Ids outside the playlist are ignored by
    /// the per-row playlist guard.
    pub async fn reorder_items(
        pool: &PgPool,
        playlist_id: DbId,
        orders: &[(DbId, i32)],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        for (item_id, sort) in orders {
            sqlx::query("UPDATE playlist_items SET sort = $3 WHERE playlist_id = $1 AND id = $2")
                .bind(playlist_id)
                .bind(item_id)
                .bind(sort)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Map a backend failure into the domain error space.
pub(crate) fn db_err(err: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("database error: {err}"))
}
