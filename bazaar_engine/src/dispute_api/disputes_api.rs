//! Unifies the API for raising, inspecting and closing disputes, and for reading and writing their chat history.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Dispute, DisputeId, DisputeImage, NewDispute, NewPersistedMessage, OrderId, PersistedMessage, UserId},
    dispute_api::{
        access_gate::{authorize_for_dispute, authorize_for_order},
        dispute_objects::DisputeWithImages,
        errors::DisputeApiError,
    },
    traits::{AccessManagement, DisputeManagement, MessageLog},
};

/// `DisputeApi` is the programmatic face of the dispute subsystem. Every operation that acts on behalf of a user runs
/// the access gate first.
pub struct DisputeApi<B> {
    db: B,
}

impl<B: Debug> Debug for DisputeApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DisputeApi ({:?})", self.db)
    }
}

impl<B> DisputeApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> DisputeApi<B>
where B: MessageLog
{
    /// Writes a chat message to the durable log. The backend refuses the write if the dispute has been resolved in the
    /// meantime, in which case [`DisputeApiError::DisputeClosed`] is returned.
    pub async fn record_message(&self, message: NewPersistedMessage) -> Result<PersistedMessage, DisputeApiError> {
        let saved = self.db.append_message(message).await?;
        Ok(saved)
    }
}

impl<B> DisputeApi<B>
where B: DisputeManagement + AccessManagement + MessageLog
{
    /// Raises a dispute against an order. Only the buyer or seller of the order may do so, and only once per order.
    /// Evidence image URLs are attached in the order given.
    pub async fn create_dispute(
        &self,
        user: &UserId,
        dispute: NewDispute,
        images: &[String],
    ) -> Result<Dispute, DisputeApiError> {
        let role = authorize_for_order(&self.db, &dispute.order_id, user).await?;
        let dispute = self.db.insert_dispute(dispute).await?;
        for url in images {
            self.db.insert_dispute_image(&dispute.id, url).await?;
        }
        info!(
            "⚖️ {role} {user} raised dispute {} against order {} with {} images",
            dispute.id,
            dispute.order_id,
            images.len()
        );
        Ok(dispute)
    }

    /// Fetches the dispute raised against `order_id`, along with its evidence. The caller must be a party to an open
    /// dispute.
    pub async fn dispute_for_order(
        &self,
        user: &UserId,
        order_id: &OrderId,
    ) -> Result<DisputeWithImages, DisputeApiError> {
        let dispute = self
            .db
            .fetch_dispute_for_order(order_id)
            .await?
            .ok_or_else(|| DisputeApiError::NoDisputeForOrder(order_id.clone()))?;
        authorize_for_dispute(&self.db, &dispute.id, user).await?;
        let images = self.db.fetch_images_for_dispute(&dispute.id).await?;
        Ok(DisputeWithImages { dispute, images })
    }

    /// Closes the dispute. This cannot be undone. Once resolved, no-one can join its chat room or post to it.
    pub async fn close_dispute(&self, user: &UserId, id: &DisputeId) -> Result<(), DisputeApiError> {
        authorize_for_dispute(&self.db, id, user).await?;
        if self.db.mark_dispute_resolved(id).await? {
            info!("⚖️ Dispute {id} closed by {user}");
            Ok(())
        } else {
            // Lost a race with another close request
            Err(DisputeApiError::DisputeClosed(id.clone()))
        }
    }

    /// Attaches an evidence image to an open dispute.
    pub async fn add_image(&self, user: &UserId, id: &DisputeId, url: &str) -> Result<DisputeImage, DisputeApiError> {
        authorize_for_dispute(&self.db, id, user).await?;
        let image = self.db.insert_dispute_image(id, url).await?;
        debug!("⚖️ {user} attached image {} to dispute {id}", image.id);
        Ok(image)
    }

    /// Returns the chat history of the dispute, oldest message first.
    pub async fn message_history(
        &self,
        user: &UserId,
        id: &DisputeId,
    ) -> Result<Vec<PersistedMessage>, DisputeApiError> {
        authorize_for_dispute(&self.db, id, user).await?;
        let messages = self.db.fetch_messages_for_dispute(id).await?;
        trace!("⚖️ Fetched {} messages for dispute {id}", messages.len());
        Ok(messages)
    }
}
