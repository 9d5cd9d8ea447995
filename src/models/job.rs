use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A job posting owned by an employer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub employer_id: String,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub is_active: bool,
    pub is_approved: bool,
    #[serde(with = "crate::models::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// New postings start active but unapproved; an admin has to approve
    /// them before job seekers can apply.
    pub fn new(employer_id: &str, title: String, description: String, location: Option<String>) -> Self {
        Job {
            id: uuid::Uuid::new_v4().to_string(),
            employer_id: employer_id.to_string(),
            title,
            description,
            location,
            is_active: true,
            is_approved: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.is_active && self.is_approved
    }
}
