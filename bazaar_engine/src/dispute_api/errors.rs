use thiserror::Error;

use crate::{
    db_types::{DisputeId, OrderId},
    traits::{AccessManagementError, DisputeManagementError, MessageLogError},
};

/// The outcome of a rejected access check.
#[derive(Debug, Clone, Error)]
pub enum AccessError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Dispute {0} does not exist")]
    DisputeNotFound(DisputeId),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("User is not the buyer or seller in this dispute")]
    Unrelated,
    #[error("Dispute {0} has been resolved")]
    Resolved(DisputeId),
}

impl From<AccessManagementError> for AccessError {
    fn from(e: AccessManagementError) -> Self {
        AccessError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum DisputeApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Access denied. {0}")]
    AccessDenied(#[from] AccessError),
    #[error("Dispute {0} does not exist")]
    DisputeNotFound(DisputeId),
    #[error("No dispute has been raised for order {0}")]
    NoDisputeForOrder(OrderId),
    #[error("A dispute has already been raised for order {0}")]
    DisputeAlreadyExists(OrderId),
    #[error("Dispute {0} is closed")]
    DisputeClosed(DisputeId),
}

impl From<DisputeManagementError> for DisputeApiError {
    fn from(e: DisputeManagementError) -> Self {
        match e {
            DisputeManagementError::DatabaseError(s) => DisputeApiError::DatabaseError(s),
            DisputeManagementError::DisputeNotFound(id) => DisputeApiError::DisputeNotFound(id),
            DisputeManagementError::DisputeAlreadyExists(oid) => DisputeApiError::DisputeAlreadyExists(oid),
        }
    }
}

impl From<MessageLogError> for DisputeApiError {
    fn from(e: MessageLogError) -> Self {
        match e {
            MessageLogError::DatabaseError(s) => DisputeApiError::DatabaseError(s),
            MessageLogError::DisputeClosed(id) => DisputeApiError::DisputeClosed(id),
        }
    }
}
