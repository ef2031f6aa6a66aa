use bazaar_engine::{
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
use mockall::mock;

mock! {
    pub Backend {}
    impl DisputeManagement for Backend {
        async fn fetch_dispute(&self, id: &DisputeId) -> Result<Option<Dispute>, DisputeManagementError>;
        async fn fetch_dispute_for_order(&self, order_id: &OrderId) -> Result<Option<Dispute>, DisputeManagementError>;
        async fn fetch_images_for_dispute(&self, id: &DisputeId) -> Result<Vec<DisputeImage>, DisputeManagementError>;
        async fn insert_dispute(&self, dispute: NewDispute) -> Result<Dispute, DisputeManagementError>;
        async fn insert_dispute_image(&self, id: &DisputeId, image_url: &str) -> Result<DisputeImage, DisputeManagementError>;
        async fn mark_dispute_resolved(&self, id: &DisputeId) -> Result<bool, DisputeManagementError>;
    }
    impl AccessManagement for Backend {
        async fn role_for_dispute(&self, dispute_id: &DisputeId, user: &UserId) -> Result<Option<ParticipantRole>, AccessManagementError>;
        async fn role_for_order(&self, order_id: &OrderId, user: &UserId) -> Result<Option<ParticipantRole>, AccessManagementError>;
    }
    impl MessageLog for Backend {
        async fn append_message(&self, message: NewPersistedMessage) -> Result<PersistedMessage, MessageLogError>;
        async fn fetch_messages_for_dispute(&self, id: &DisputeId) -> Result<Vec<PersistedMessage>, MessageLogError>;
    }
}
