//! Screen row model.

use serde::Serialize;
use sqlx::FromRow;

use beamview_core::error::CoreError;
use beamview_core::store::{AccessScope, Screen};
use beamview_core::types::{DbId, Timestamp};

/// A row from the `screens` table.
///
/// `playlist_override` is a single nullable column; the engine treats it as
/// the second level of resolution precedence, below the explicit
/// `playlist_id` assignment.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScreenRow {
    pub id: DbId,
    pub customer_id: DbId,
    pub playlist_id: Option<DbId>,
    pub playlist_override: Option<DbId>,
    pub access_scope: String,
    pub last_check_in_at: Option<Timestamp>,
}

impl TryFrom<ScreenRow> for Screen {
    type Error = CoreError;

    fn try_from(row: ScreenRow) -> Result<Self, CoreError> {
        let access_scope = match row.access_scope.as_str() {
            "company" => AccessScope::Company,
            "user" => AccessScope::User,
            other => {
                return Err(CoreError::Validation(format!(
                    "Unknown access scope: {other}"
                )))
            }
        };
        Ok(Screen {
            id: row.id,
            customer_id: row.customer_id,
            playlist_id: row.playlist_id,
            playlist_override: row.playlist_override,
            access_scope,
            last_check_in_at: row.last_check_in_at,
        })
    }
}
