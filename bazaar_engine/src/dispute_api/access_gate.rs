//! The access gate decides whether a user may take part in a dispute.
//!
//! Only the buyer of the disputed order and the owner of the store that sold it are admitted, and only while the
//! dispute is open. Every check goes to the backend; nothing is cached between calls.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{DisputeId, OrderId, ParticipantRole, UserId},
    dispute_api::errors::AccessError,
    traits::AccessManagement,
};

pub struct AccessGate<B> {
    db: B,
}

impl<B: Debug> Debug for AccessGate<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessGate ({:?})", self.db)
    }
}

impl<B> AccessGate<B>
where B: AccessManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Admits `user` to the dispute if they are its buyer or seller and the dispute is unresolved.
    /// On success, the user's role is returned.
    pub async fn authorize(&self, dispute_id: &DisputeId, user: &UserId) -> Result<ParticipantRole, AccessError> {
        authorize_for_dispute(&self.db, dispute_id, user).await
    }

    /// Admits `user` to act on the order if they are its buyer or seller.
    pub async fn authorize_order(&self, order_id: &OrderId, user: &UserId) -> Result<ParticipantRole, AccessError> {
        authorize_for_order(&self.db, order_id, user).await
    }
}

pub(crate) async fn authorize_for_dispute<B: AccessManagement>(
    db: &B,
    dispute_id: &DisputeId,
    user: &UserId,
) -> Result<ParticipantRole, AccessError> {
    let role = db.role_for_dispute(dispute_id, user).await?;
    let result = match role {
        None => Err(AccessError::DisputeNotFound(dispute_id.clone())),
        Some(ParticipantRole::Resolved) => Err(AccessError::Resolved(dispute_id.clone())),
        Some(ParticipantRole::Unrelated) => Err(AccessError::Unrelated),
        Some(role) => Ok(role),
    };
    match &result {
        Ok(role) => trace!("⚖️ {user} admitted to dispute {dispute_id} as {role}"),
        Err(e) => debug!("⚖️ {user} refused access to dispute {dispute_id}. {e}"),
    }
    result
}

pub(crate) async fn authorize_for_order<B: AccessManagement>(
    db: &B,
    order_id: &OrderId,
    user: &UserId,
) -> Result<ParticipantRole, AccessError> {
    match db.role_for_order(order_id, user).await? {
        None => Err(AccessError::OrderNotFound(order_id.clone())),
        Some(role) if role.is_participant() => Ok(role),
        Some(_) => {
            debug!("⚖️ {user} is not a party to order {order_id}");
            Err(AccessError::Unrelated)
        },
    }
}
