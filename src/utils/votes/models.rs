use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::utils::events::models::{LocationOption, TimeOption};

pub const MAX_PREFERENCE: u8 = 5;

/// Which family of options a vote belongs to. Each family keeps its votes
/// in its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Time,
    Location,
}

impl OptionKind {
    pub fn options_table(&self) -> &'static str {
        match self {
            OptionKind::Time => "time_options",
            OptionKind::Location => "location_options",
        }
    }

    pub fn votes_table(&self) -> &'static str {
        match self {
            OptionKind::Time => "time_votes",
            OptionKind::Location => "location_votes",
        }
    }
}

/// Score between 0 and 5 a voter assigns to one option. Zero is stored
/// but never counted as a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Preference(u8);

impl Preference {
    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn counts(&self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<i64> for Preference {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..=MAX_PREFERENCE as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(format!("Preference must be between 0 and {MAX_PREFERENCE}"))
        }
    }
}

impl From<Preference> for u8 {
    fn from(value: Preference) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Vote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub option_id: Uuid,
    pub event_id: Uuid,
    #[schema(value_type = u8)]
    pub preference: Preference,
    #[serde(with = "time::serde::rfc3339")]
    pub voted_at: OffsetDateTime,
}

impl Vote {
    pub fn new(user_id: Uuid, target: &VoteTarget, preference: Preference) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            option_id: target.option_id(),
            event_id: target.parent_event(),
            preference,
            voted_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Option a vote is cast on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteTarget {
    Time(TimeOption),
    Location(LocationOption),
}

impl VoteTarget {
    pub fn parent_event(&self) -> Uuid {
        match self {
            VoteTarget::Time(option) => option.event_id,
            VoteTarget::Location(option) => option.event_id,
        }
    }

    pub fn option_id(&self) -> Uuid {
        match self {
            VoteTarget::Time(option) => option.id,
            VoteTarget::Location(option) => option.id,
        }
    }

    pub fn kind(&self) -> OptionKind {
        match self {
            VoteTarget::Time(_) => OptionKind::Time,
            VoteTarget::Location(_) => OptionKind::Location,
        }
    }
}

/// One row of the per-voter breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VoterEntry {
    pub user_id: Uuid,
    pub username: String,
    #[schema(value_type = u8)]
    pub preference: Preference,
    #[serde(with = "time::serde::rfc3339")]
    pub voted_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OptionTally {
    pub option_id: Uuid,
    pub vote_count: usize,
    #[schema(value_type = Option<u8>)]
    pub my_preference: Option<Preference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voters: Option<Vec<VoterEntry>>,
}
