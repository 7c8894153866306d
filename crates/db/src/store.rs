//! Production `PlaylistStore` over Postgres.

use async_trait::async_trait;
use sqlx::PgPool;

use beamview_core::error::CoreError;
use beamview_core::store::{
    Playlist, PlaylistItem, PlaylistStore, PlaylistWithItems, Screen, ScreenScope,
};
use beamview_core::types::DbId;

use crate::models::playlist::PlaylistRow;
use crate::repositories::playlist_repo::db_err;
use crate::repositories::{PlaylistRepo, ScreenRepo};

/// [`PlaylistStore`] implementation backed by the repositories.
#[derive(Clone)]
pub struct PgPlaylistStore {
    pool: PgPool,
}

impl PgPlaylistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn attach_items(&self, row: PlaylistRow) -> Result<PlaylistWithItems, CoreError> {
        let items = self.list_items_ordered(row.id).await?;
        Ok(PlaylistWithItems {
            playlist: row.into(),
            items,
        })
    }
}

#[async_trait]
impl PlaylistStore for PgPlaylistStore {
    async fn find_default(
        &self,
        customer_id: DbId,
    ) -> Result<Option<PlaylistWithItems>, CoreError> {
        match PlaylistRepo::find_default(&self.pool, customer_id)
            .await
            .map_err(db_err)?
        {
            Some(row) => Ok(Some(self.attach_items(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_playlist(&self, playlist_id: DbId) -> Result<Option<Playlist>, CoreError> {
        Ok(PlaylistRepo::find_by_id(&self.pool, playlist_id)
            .await
            .map_err(db_err)?
            .map(Into::into))
    }

    async fn find_playlist_with_items(
        &self,
        playlist_id: DbId,
    ) -> Result<Option<PlaylistWithItems>, CoreError> {
        match PlaylistRepo::find_by_id(&self.pool, playlist_id)
            .await
            .map_err(db_err)?
        {
            Some(row) => Ok(Some(self.attach_items(row).await?)),
            None => Ok(None),
        }
    }

    async fn list_items_ordered(
        &self,
        playlist_id: DbId,
    ) -> Result<Vec<PlaylistItem>, CoreError> {
        PlaylistRepo::list_items_ordered(&self.pool, playlist_id)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }

    async fn find_screen(&self, screen_id: DbId) -> Result<Option<Screen>, CoreError> {
        ScreenRepo::find_by_id(&self.pool, screen_id)
            .await
            .map_err(db_err)?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn upsert_screen_override(
        &self,
        screen_id: DbId,
        playlist_id: Option<DbId>,
    ) -> Result<(), CoreError> {
        let updated = ScreenRepo::set_override(&self.pool, screen_id, playlist_id)
            .await
            .map_err(db_err)?;
        if !updated {
            return Err(CoreError::NotFound {
                entity: "screen",
                id: screen_id,
            });
        }
        Ok(())
    }

    async fn set_default_playlist(
        &self,
        customer_id: DbId,
        playlist_id: DbId,
    ) -> Result<bool, CoreError> {
        PlaylistRepo::set_default(&self.pool, customer_id, playlist_id)
            .await
            .map_err(db_err)
    }

    async fn list_screen_ids(&self, customer_id: DbId) -> Result<Vec<DbId>, CoreError> {
        ScreenRepo::list_ids_for_customer(&self.pool, customer_id)
            .await
            .map_err(db_err)
    }

    async fn list_screens_page(
        &self,
        scope: &ScreenScope,
        after_id: DbId,
        limit: i64,
    ) -> Result<Vec<Screen>, CoreError> {
        ScreenRepo::list_page(&self.pool, scope, after_id, limit)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(TryInto::try_into)
            .collect()
    }
}
