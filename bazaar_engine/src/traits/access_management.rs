use thiserror::Error;

use crate::db_types::{DisputeId, OrderId, ParticipantRole, UserId};

#[derive(Debug, Clone, Error)]
pub enum AccessManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Role definitions in the database and code have diverged. {0}")]
    InvalidRole(String),
}

impl From<sqlx::Error> for AccessManagementError {
    fn from(e: sqlx::Error) -> Self {
        AccessManagementError::DatabaseError(e.to_string())
    }
}

/// Resolves how a user relates to a dispute or an order.
///
/// Implementations walk the ownership chain dispute → order → product → store. A user is the `Buyer` if they placed
/// the order, and the `Seller` if they own the store that sold the product. The role lookups are evaluated afresh on
/// every call; nothing may be cached, since a dispute can be resolved at any time.
#[allow(async_fn_in_trait)]
pub trait AccessManagement {
    /// Returns the role of `user` in the dispute, or `None` if the dispute does not exist.
    ///
    /// If the dispute is resolved, [`ParticipantRole::Resolved`] is returned regardless of who is asking.
    async fn role_for_dispute(
        &self,
        dispute_id: &DisputeId,
        user: &UserId,
    ) -> Result<Option<ParticipantRole>, AccessManagementError>;

    /// Returns the role of `user` for the given order, or `None` if the order does not exist.
    /// This never returns [`ParticipantRole::Resolved`].
    async fn role_for_order(
        &self,
        order_id: &OrderId,
        user: &UserId,
    ) -> Result<Option<ParticipantRole>, AccessManagementError>;
}
