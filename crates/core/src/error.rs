use crate::types::DbId;

/// Domain-level error taxonomy.
///
/// Transport failures against the push gateway are deliberately *not* part
/// of this enum: pushes are best-effort and their failures are reported per
/// screen, never raised as a domain error.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A playlist was assigned to a screen of a different customer.
    #[error("Scope violation: playlist {playlist_id} does not belong to customer {customer_id}")]
    ScopeViolation {
        playlist_id: DbId,
        customer_id: DbId,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
