use thiserror::Error;

use crate::db_types::{Dispute, DisputeId, DisputeImage, NewDispute, OrderId};

#[derive(Debug, Clone, Error)]
pub enum DisputeManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Dispute {0} does not exist")]
    DisputeNotFound(DisputeId),
    #[error("A dispute has already been raised for order {0}")]
    DisputeAlreadyExists(OrderId),
}

impl From<sqlx::Error> for DisputeManagementError {
    fn from(e: sqlx::Error) -> Self {
        DisputeManagementError::DatabaseError(e.to_string())
    }
}

/// The `DisputeManagement` trait defines behaviour for creating, reading and closing disputes.
///
/// None of these methods perform any authorization. Callers are expected to consult the access gate (see
/// [`crate::AccessGate`]) before calling through to the backend.
#[allow(async_fn_in_trait)]
pub trait DisputeManagement {
    /// Fetches the dispute with the given id. If no such dispute exists, `None` is returned.
    async fn fetch_dispute(&self, id: &DisputeId) -> Result<Option<Dispute>, DisputeManagementError>;

    /// Fetches the dispute raised against the given order, if any.
    async fn fetch_dispute_for_order(&self, order_id: &OrderId) -> Result<Option<Dispute>, DisputeManagementError>;

    /// Fetches all the evidence images attached to a dispute, oldest first.
    async fn fetch_images_for_dispute(&self, id: &DisputeId) -> Result<Vec<DisputeImage>, DisputeManagementError>;

    /// Stores a new, unresolved dispute. Only one dispute may exist per order.
    async fn insert_dispute(&self, dispute: NewDispute) -> Result<Dispute, DisputeManagementError>;

    /// Attaches an evidence image URL to an existing dispute.
    async fn insert_dispute_image(
        &self,
        id: &DisputeId,
        image_url: &str,
    ) -> Result<DisputeImage, DisputeManagementError>;

    /// Marks the dispute as resolved.
    ///
    /// Returns `true` if the dispute transitioned from open to resolved, and `false` if it was already resolved.
    async fn mark_dispute_resolved(&self, id: &DisputeId) -> Result<bool, DisputeManagementError>;
}
