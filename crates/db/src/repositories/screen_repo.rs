//! Repository for the `screens` table.

use sqlx::PgPool;

use beamview_core::store::ScreenScope;
use beamview_core::types::DbId;

use crate::models::screen::ScreenRow;

/// Column list for `screens` queries.
const COLUMNS: &str =
    "id, customer_id, playlist_id, playlist_override, access_scope, last_check_in_at";

/// Provides access to screens.
pub struct ScreenRepo;

impl ScreenRepo {
    pub async fn find_by_id(
        pool: &PgPool,
        screen_id: DbId,
    ) -> Result<Option<ScreenRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM screens WHERE id = $1");
        sqlx::query_as::<_, ScreenRow>(&query)
            .bind(screen_id)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the per-screen override. Returns `false` when the
    /// screen does not exist.
    pub async fn set_override(
        pool: &PgPool,
        screen_id: DbId,
        playlist_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE screens SET playlist_override = $2, updated_at = NOW() WHERE id = $1")
                .bind(screen_id)
                .bind(playlist_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One page of screens in `scope` with `id > after_id`, ascending by
    /// id. Paging by id keeps memory bounded no matter how large the scope
    /// is; callers loop until an empty page comes back.
    pub async fn list_page(
        pool: &PgPool,
        scope: &ScreenScope,
        after_id: DbId,
        limit: i64,
    ) -> Result<Vec<ScreenRow>, sqlx::Error> {
        match scope {
            ScreenScope::All => {
                let query = format!(
                    "SELECT {COLUMNS} FROM screens WHERE id > $1 ORDER BY id ASC LIMIT $2"
                );
                sqlx::query_as::<_, ScreenRow>(&query)
                    .bind(after_id)
                    .bind(limit)
                    .fetch_all(pool)
                    .await
            }
            ScreenScope::Customer(customer_id) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM screens \
                     WHERE customer_id = $1 AND id > $2 \
                     ORDER BY id ASC LIMIT $3"
                );
                sqlx::query_as::<_, ScreenRow>(&query)
                    .bind(customer_id)
                    .bind(after_id)
                    .bind(limit)
                    .fetch_all(pool)
                    .await
            }
            ScreenScope::Screens(ids) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM screens \
                     WHERE id = ANY($1) AND id > $2 \
                     ORDER BY id ASC LIMIT $3"
                );
                sqlx::query_as::<_, ScreenRow>(&query)
                    .bind(ids.as_slice())
                    .bind(after_id)
                    .bind(limit)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// All screen ids of a tenant, for broadcast bumps.
    pub async fn list_ids_for_customer(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM screens WHERE customer_id = $1 ORDER BY id ASC")
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }

    /// Record a device check-in. Returns `false` when the screen does not
    /// exist.
    pub async fn touch_check_in(pool: &PgPool, screen_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE screens SET last_check_in_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(screen_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
