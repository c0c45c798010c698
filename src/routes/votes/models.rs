use crate::routes::events::models::{LocationOptionTally, TimeOptionTally};
use crate::utils::votes::models::{OptionKind, Vote};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

/// `preference` is checked by hand so that strings like `"4"` are accepted
/// and anything else gets a proper error body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CastVote {
    #[serde(default)]
    #[schema(value_type = u8)]
    pub preference: Value,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CastVoteResult {
    pub message: String,
    pub kind: OptionKind,
    pub vote: Vote,
}

impl CastVoteResult {
    pub fn new(kind: OptionKind, vote: Vote, created: bool) -> Self {
        let message = if created {
            "Vote recorded."
        } else {
            "Vote updated."
        };
        Self {
            message: message.to_string(),
            kind,
            vote,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct VoteSummary {
    pub event_id: Uuid,
    pub time_options: Vec<TimeOptionTally>,
    pub location_options: Vec<LocationOptionTally>,
}
