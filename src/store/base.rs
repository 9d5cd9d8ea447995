use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use super::{memory_store::MemoryStore, mongodb_store::MongoDBStore};
use crate::config::StoreConfig;
use crate::models::{
    ApplicationStatus, Engagement, EngagementKind, Job, JobApplication, Notification, User,
};

/// Storage failures. `Duplicate` is an expected outcome: it means a
/// uniqueness constraint rejected the write, and callers decide what it
/// means for them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("{0}")]
    Backend(String),
}

/// The Store trait abstracts persistence of users, jobs, applications,
/// engagements and notifications.
///
/// Implementations must enforce these uniqueness constraints at write time:
/// - `users.email`
/// - `applications(job_id, job_seeker_id)`
/// - `engagements(job_id, user_id, kind)` for toggle kinds only
///
/// Methods that take both an application change and a notification must
/// apply the two writes atomically.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Returns the user only while it is active.
    async fn find_active_user(&self, id: &str) -> Result<Option<User>, StoreError>;
    /// Returns false when no user has that id.
    async fn set_user_active(&self, id: &str, active: bool) -> Result<bool, StoreError>;

    async fn insert_job(&self, job: &Job) -> Result<(), StoreError>;
    async fn find_job(&self, id: &str) -> Result<Option<Job>, StoreError>;
    async fn list_visible_jobs(&self) -> Result<Vec<Job>, StoreError>;
    async fn set_job_approved(&self, id: &str, approved: bool) -> Result<bool, StoreError>;

    async fn find_application_by_pair(
        &self,
        job_id: &str,
        job_seeker_id: &str,
    ) -> Result<Option<JobApplication>, StoreError>;
    /// Inserts the application and the employer's notification together.
    async fn insert_application(
        &self,
        application: &JobApplication,
        notification: &Notification,
    ) -> Result<(), StoreError>;
    /// Looks up an application through its job, returning it only when the
    /// job belongs to `employer_id`.
    async fn find_owned_application(
        &self,
        application_id: &str,
        employer_id: &str,
    ) -> Result<Option<JobApplication>, StoreError>;
    /// Sets the status and inserts the seeker's notification together.
    /// Returns false, writing nothing, when the application does not exist.
    async fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
        updated_at: DateTime<Utc>,
        notification: &Notification,
    ) -> Result<bool, StoreError>;
    async fn list_applications_for_seeker(
        &self,
        job_seeker_id: &str,
    ) -> Result<Vec<JobApplication>, StoreError>;
    async fn list_applications_for_job(&self, job_id: &str) -> Result<Vec<JobApplication>, StoreError>;

    async fn find_engagement(
        &self,
        job_id: &str,
        user_id: &str,
        kind: EngagementKind,
    ) -> Result<Option<Engagement>, StoreError>;
    async fn insert_engagement(&self, engagement: &Engagement) -> Result<(), StoreError>;
    /// Returns false when there was nothing to delete.
    async fn delete_engagement(
        &self,
        job_id: &str,
        user_id: &str,
        kind: EngagementKind,
    ) -> Result<bool, StoreError>;
    async fn list_engagements(&self, job_id: &str) -> Result<Vec<Engagement>, StoreError>;

    /// Newest first.
    async fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>, StoreError>;
    /// Only the recipient can mark a notification; returns false otherwise.
    async fn mark_notification_read(&self, id: &str, user_id: &str) -> Result<bool, StoreError>;
}

/// Creates a concrete store implementation based on the StoreConfig.
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn Store>, StoreError> {
    match config {
        StoreConfig::Memory => {
            info!("Using in-memory store; data is lost on restart.");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreConfig::MongoDB(mongo_config) => {
            let store = MongoDBStore::new(mongo_config).await?;
            info!("Successfully created MongoDB store.");
            Ok(Arc::new(store))
        }
    }
}
