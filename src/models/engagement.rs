use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a user did to a job.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    Like,
    Comment,
    Favorite,
    Interest,
}

impl EngagementKind {
    pub const TOGGLE_KINDS: [EngagementKind; 3] = [
        EngagementKind::Like,
        EngagementKind::Favorite,
        EngagementKind::Interest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementKind::Like => "like",
            EngagementKind::Comment => "comment",
            EngagementKind::Favorite => "favorite",
            EngagementKind::Interest => "interest",
        }
    }

    /// Toggle kinds form a set per (job, user); comments are append-only.
    pub fn is_toggle(&self) -> bool {
        !matches!(self, EngagementKind::Comment)
    }
}

impl fmt::Display for EngagementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngagementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(EngagementKind::Like),
            "comment" => Ok(EngagementKind::Comment),
            "favorite" => Ok(EngagementKind::Favorite),
            "interest" => Ok(EngagementKind::Interest),
            other => Err(format!("Invalid engagement type '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Engagement {
    pub id: String,
    pub job_id: String,
    pub user_id: String,
    pub kind: EngagementKind,
    /// Only set for comments.
    pub content: Option<String>,
    #[serde(with = "crate::models::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Engagement {
    pub fn new(job_id: &str, user_id: &str, kind: EngagementKind, content: Option<String>) -> Self {
        Engagement {
            id: uuid::Uuid::new_v4().to_string(),
            job_id: job_id.to_string(),
            user_id: user_id.to_string(),
            kind,
            content: if kind.is_toggle() { None } else { content },
            created_at: Utc::now(),
        }
    }
}

/// Result of an engagement request.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngageOutcome {
    Added,
    Removed,
}

impl EngageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngageOutcome::Added => "added",
            EngageOutcome::Removed => "removed",
        }
    }
}
