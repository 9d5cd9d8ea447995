use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states of a job application. `Submitted` is only ever the
/// initial state; employers move applications to one of the others.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    Shortlisted,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }

    /// Rejected and hired are not locked, but moving out of them is unusual.
    pub fn is_final(&self) -> bool {
        matches!(self, ApplicationStatus::Rejected | ApplicationStatus::Hired)
    }

    /// The message sent to the job seeker when an employer moves their
    /// application into this state. `None` for states employers cannot set.
    pub fn seeker_message(&self) -> Option<&'static str> {
        match self {
            ApplicationStatus::Submitted => None,
            ApplicationStatus::UnderReview => Some("Your application is under review"),
            ApplicationStatus::Shortlisted => Some("Congratulations! You have been shortlisted"),
            ApplicationStatus::Rejected => {
                Some("Unfortunately, you have not been selected for this position")
            }
            ApplicationStatus::Hired => Some("Congratulations! You have been hired"),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(ApplicationStatus::Submitted),
            "under_review" => Ok(ApplicationStatus::UnderReview),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "hired" => Ok(ApplicationStatus::Hired),
            other => Err(format!("Invalid application status '{}'", other)),
        }
    }
}

/// A job seeker's application to one job. Unique per (job_id, job_seeker_id).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JobApplication {
    pub id: String,
    pub job_id: String,
    pub job_seeker_id: String,
    pub cover_note: Option<String>,
    pub status: ApplicationStatus,
    #[serde(with = "crate::models::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::models::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl JobApplication {
    pub fn new(job_id: &str, job_seeker_id: &str, cover_note: Option<String>) -> Self {
        let now = Utc::now();
        JobApplication {
            id: uuid::Uuid::new_v4().to_string(),
            job_id: job_id.to_string(),
            job_seeker_id: job_seeker_id.to_string(),
            cover_note,
            status: ApplicationStatus::Submitted,
            created_at: now,
            updated_at: now,
        }
    }
}
