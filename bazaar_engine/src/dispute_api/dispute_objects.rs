use serde::{Deserialize, Serialize};

use crate::db_types::{Dispute, DisputeImage};

/// A dispute along with all of its evidence images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeWithImages {
    #[serde(flatten)]
    pub dispute: Dispute,
    pub images: Vec<DisputeImage>,
}
