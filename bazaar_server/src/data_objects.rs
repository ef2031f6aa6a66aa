use bazaar_engine::db_types::{DisputeId, OrderId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub id: DisputeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: DisputeId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinRoomParams {
    /// The display name shown to the other participants. Defaults to the user id.
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDisputeRequest {
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
    /// The buyer's or seller's description of the problem.
    pub dispute: String,
    /// URLs of evidence images that have already been uploaded to the object store.
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDisputeResponse {
    pub id: DisputeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewImageRequest {
    pub url: String,
}
