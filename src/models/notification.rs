use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::application::{ApplicationStatus, JobApplication};
use super::job::Job;

pub const NEW_APPLICATION_TITLE: &str = "New Job Application";
pub const STATUS_UPDATE_TITLE: &str = "Application Status Update";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewApplication,
    ApplicationStatus,
}

/// A message addressed to one user. Only `is_read` changes after creation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub related_id: Option<String>,
    pub is_read: bool,
    #[serde(with = "crate::models::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: &str, title: &str, message: String, kind: NotificationKind, related_id: Option<String>) -> Self {
        Notification {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            message,
            kind,
            related_id,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    /// Tells the employer that someone applied to one of their jobs.
    pub fn new_application(job: &Job, application: &JobApplication) -> Self {
        Notification::new(
            &job.employer_id,
            NEW_APPLICATION_TITLE,
            format!("A new application has been submitted for \"{}\"", job.title),
            NotificationKind::NewApplication,
            Some(application.id.clone()),
        )
    }

    /// Tells the job seeker their application moved. Returns `None` for
    /// statuses that have no seeker-facing message.
    pub fn status_update(application: &JobApplication, status: ApplicationStatus) -> Option<Self> {
        let message = status.seeker_message()?;
        Some(Notification::new(
            &application.job_seeker_id,
            STATUS_UPDATE_TITLE,
            message.to_string(),
            NotificationKind::ApplicationStatus,
            Some(application.id.clone()),
        ))
    }
}
