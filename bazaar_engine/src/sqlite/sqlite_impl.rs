//! `SqliteDatabase` is a concrete implementation of a Bazaar dispute engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, migrate::MigrateError, SqlitePool};

use super::db::{access, disputes, messages, new_pool};
use crate::{
    db_types::{
        Dispute,
        DisputeId,
        DisputeImage,
        NewDispute,
        NewPersistedMessage,
        OrderId,
        ParticipantRole,
        PersistedMessage,
        UserId,
    },
    traits::{
        AccessManagement,
        AccessManagementError,
        DisputeManagement,
        DisputeManagementError,
        MessageLog,
        MessageLogError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl DisputeManagement for SqliteDatabase {
    async fn fetch_dispute(&self, id: &DisputeId) -> Result<Option<Dispute>, DisputeManagementError> {
        let mut conn = self.pool.acquire().await?;
        let dispute = disputes::fetch_dispute(id, &mut conn).await?;
        Ok(dispute)
    }

    async fn fetch_dispute_for_order(&self, order_id: &OrderId) -> Result<Option<Dispute>, DisputeManagementError> {
        let mut conn = self.pool.acquire().await?;
        let dispute = disputes::fetch_dispute_for_order(order_id, &mut conn).await?;
        Ok(dispute)
    }

    async fn fetch_images_for_dispute(&self, id: &DisputeId) -> Result<Vec<DisputeImage>, DisputeManagementError> {
        let mut conn = self.pool.acquire().await?;
        let images = disputes::fetch_images(id, &mut conn).await?;
        Ok(images)
    }

    async fn insert_dispute(&self, dispute: NewDispute) -> Result<Dispute, DisputeManagementError> {
        let mut conn = self.pool.acquire().await?;
        disputes::insert_dispute(dispute, &mut conn).await
    }

    async fn insert_dispute_image(
        &self,
        id: &DisputeId,
        image_url: &str,
    ) -> Result<DisputeImage, DisputeManagementError> {
        let mut conn = self.pool.acquire().await?;
        disputes::insert_image(id, image_url, &mut conn).await
    }

    async fn mark_dispute_resolved(&self, id: &DisputeId) -> Result<bool, DisputeManagementError> {
        let mut tx = self.pool.begin().await?;
        let dispute = disputes::fetch_dispute(id, &mut tx).await?;
        if dispute.is_none() {
            return Err(DisputeManagementError::DisputeNotFound(id.clone()));
        }
        let changed = disputes::mark_resolved(id, &mut tx).await?;
        tx.commit().await?;
        if changed {
            info!("🗃️ Dispute {id} has been marked as resolved");
        } else {
            debug!("🗃️ Dispute {id} was already resolved");
        }
        Ok(changed)
    }
}

impl AccessManagement for SqliteDatabase {
    async fn role_for_dispute(
        &self,
        dispute_id: &DisputeId,
        user: &UserId,
    ) -> Result<Option<ParticipantRole>, AccessManagementError> {
        let mut conn = self.pool.acquire().await?;
        access::role_for_dispute(dispute_id, user, &mut conn).await
    }

    async fn role_for_order(
        &self,
        order_id: &OrderId,
        user: &UserId,
    ) -> Result<Option<ParticipantRole>, AccessManagementError> {
        let mut conn = self.pool.acquire().await?;
        access::role_for_order(order_id, user, &mut conn).await
    }
}

impl MessageLog for SqliteDatabase {
    async fn append_message(&self, message: NewPersistedMessage) -> Result<PersistedMessage, MessageLogError> {
        let mut conn = self.pool.acquire().await?;
        messages::append_message(message, &mut conn).await
    }

    async fn fetch_messages_for_dispute(&self, id: &DisputeId) -> Result<Vec<PersistedMessage>, MessageLogError> {
        let mut conn = self.pool.acquire().await?;
        let history = messages::fetch_messages(id, &mut conn).await?;
        Ok(history)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. The migrations are embedded in the binary at compile time.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&mut self) {
        self.pool.close().await;
        debug!("🗃️ Database connection pool closed");
    }
}
