use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{ApplicationStatus, JobApplication, Notification};
use crate::store::{Store, StoreError};

/// Owns the job application state machine:
/// `submitted -> {under_review, shortlisted, rejected, hired}`.
///
/// Every state change is written together with the notification it
/// produces, in a single store call.
pub struct Applications {
    store: Arc<dyn Store>,
}

impl Applications {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Applications { store }
    }

    /// Applies `job_seeker_id` to `job_id` and notifies the job's employer.
    ///
    /// A missing, inactive or unapproved job is `JobNotFound`. An existing
    /// application for the pair is `AlreadyApplied`; the upfront lookup only
    /// saves a write, the store's unique key on the pair is what actually
    /// holds when two submissions race.
    pub async fn submit(
        &self,
        job_id: &str,
        job_seeker_id: &str,
        cover_note: Option<String>,
    ) -> Result<JobApplication, AppError> {
        let job = match self.store.find_job(job_id).await? {
            Some(job) if job.is_visible() => job,
            _ => return Err(AppError::JobNotFound),
        };

        if self
            .store
            .find_application_by_pair(job_id, job_seeker_id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyApplied);
        }

        let application = JobApplication::new(job_id, job_seeker_id, cover_note);
        let notification = Notification::new_application(&job, &application);

        match self.store.insert_application(&application, &notification).await {
            Ok(()) => {
                info!(
                    application_id = %application.id,
                    job_id = %job_id,
                    job_seeker_id = %job_seeker_id,
                    "Application submitted"
                );
                Ok(application)
            }
            Err(StoreError::Duplicate(_)) => {
                info!(job_id = %job_id, job_seeker_id = %job_seeker_id, "Concurrent duplicate application rejected");
                Err(AppError::AlreadyApplied)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Moves an application to `new_status` on behalf of `employer_id` and
    /// notifies the job seeker.
    ///
    /// Ownership is checked through the application's job. An employer who
    /// does not own that job gets `NotFound`, exactly as if the application
    /// did not exist. Rejected and hired are not locked: moving out of them
    /// is allowed and only logged. Repeating a transition sends another
    /// notification.
    pub async fn transition(
        &self,
        application_id: &str,
        employer_id: &str,
        new_status: ApplicationStatus,
    ) -> Result<JobApplication, AppError> {
        let mut application = self
            .store
            .find_owned_application(application_id, employer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Application not found"))?;

        let notification = Notification::status_update(&application, new_status).ok_or_else(|| {
            AppError::validation(format!("Cannot set application status to '{}'", new_status))
        })?;

        if application.status.is_final() && application.status != new_status {
            warn!(
                application_id = %application_id,
                from = %application.status,
                to = %new_status,
                "Application moved out of a final status"
            );
        }

        let updated_at = Utc::now();
        let updated = self
            .store
            .update_application_status(application_id, new_status, updated_at, &notification)
            .await?;
        if !updated {
            return Err(AppError::not_found("Application not found"));
        }

        info!(
            application_id = %application_id,
            from = %application.status,
            to = %new_status,
            "Application status changed"
        );
        application.status = new_status;
        application.updated_at = updated_at;
        Ok(application)
    }

    pub async fn list_for_seeker(&self, job_seeker_id: &str) -> Result<Vec<JobApplication>, AppError> {
        Ok(self.store.list_applications_for_seeker(job_seeker_id).await?)
    }

    /// Applications to one job, visible only to the employer who owns it.
    pub async fn list_for_job(
        &self,
        job_id: &str,
        employer_id: &str,
    ) -> Result<Vec<JobApplication>, AppError> {
        match self.store.find_job(job_id).await? {
            Some(job) if job.employer_id == employer_id => {
                Ok(self.store.list_applications_for_job(job_id).await?)
            }
            _ => Err(AppError::JobNotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::{NEW_APPLICATION_TITLE, STATUS_UPDATE_TITLE};
    use crate::models::{Job, NotificationKind};
    use crate::store::MemoryStore;

    struct Fixture {
        store: Arc<dyn Store>,
        applications: Applications,
        job: Job,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut job = Job::new("employer-e", "Backend Engineer".to_string(), "Rust".to_string(), None);
        job.is_approved = true;
        store.insert_job(&job).await.unwrap();
        Fixture {
            applications: Applications::new(store.clone()),
            store,
            job,
        }
    }

    #[tokio::test]
    async fn test_submit_creates_application_and_employer_notification() {
        let f = fixture().await;
        let app = f
            .applications
            .submit(&f.job.id, "seeker-s", Some("Hire me".to_string()))
            .await
            .unwrap();
        assert_eq!(app.status, ApplicationStatus::Submitted);

        let notes = f.store.list_notifications("employer-e").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, NEW_APPLICATION_TITLE);
        assert_eq!(notes[0].kind, NotificationKind::NewApplication);
        assert_eq!(notes[0].related_id.as_deref(), Some(app.id.as_str()));
    }

    #[tokio::test]
    async fn test_second_submit_is_already_applied() {
        let f = fixture().await;
        f.applications.submit(&f.job.id, "seeker-s", None).await.unwrap();
        let res = f.applications.submit(&f.job.id, "seeker-s", None).await;
        assert_eq!(res, Err(AppError::AlreadyApplied));

        assert_eq!(f.store.list_applications_for_job(&f.job.id).await.unwrap().len(), 1);
        assert_eq!(f.store.list_notifications("employer-e").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_submits_leave_one_application() {
        let f = fixture().await;
        let (a, b) = tokio::join!(
            f.applications.submit(&f.job.id, "seeker-s", None),
            f.applications.submit(&f.job.id, "seeker-s", None),
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(f.store.list_applications_for_job(&f.job.id).await.unwrap().len(), 1);
        assert_eq!(f.store.list_notifications("employer-e").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_to_hidden_jobs_is_job_not_found() {
        let f = fixture().await;

        let unapproved = Job::new("employer-e", "Draft".to_string(), "d".to_string(), None);
        f.store.insert_job(&unapproved).await.unwrap();

        let mut inactive = Job::new("employer-e", "Closed".to_string(), "d".to_string(), None);
        inactive.is_approved = true;
        inactive.is_active = false;
        f.store.insert_job(&inactive).await.unwrap();

        for job_id in [unapproved.id.as_str(), inactive.id.as_str(), "missing"] {
            let res = f.applications.submit(job_id, "seeker-s", None).await;
            assert_eq!(res, Err(AppError::JobNotFound), "job {}", job_id);
        }
        assert!(f.store.list_notifications("employer-e").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transition_updates_status_and_notifies_seeker() {
        let f = fixture().await;
        let app = f.applications.submit(&f.job.id, "seeker-s", None).await.unwrap();

        let moved = f
            .applications
            .transition(&app.id, "employer-e", ApplicationStatus::Shortlisted)
            .await
            .unwrap();
        assert_eq!(moved.status, ApplicationStatus::Shortlisted);

        let stored = f.store.find_owned_application(&app.id, "employer-e").await.unwrap().unwrap();
        assert_eq!(stored.status, ApplicationStatus::Shortlisted);

        let notes = f.store.list_notifications("seeker-s").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, STATUS_UPDATE_TITLE);
        assert_eq!(notes[0].message, "Congratulations! You have been shortlisted");
    }

    #[tokio::test]
    async fn test_transition_by_non_owner_is_not_found_and_changes_nothing() {
        let f = fixture().await;
        let app = f.applications.submit(&f.job.id, "seeker-s", None).await.unwrap();

        let res = f
            .applications
            .transition(&app.id, "employer-other", ApplicationStatus::Hired)
            .await;
        assert!(matches!(res, Err(AppError::NotFound(_))));

        let stored = f.store.find_owned_application(&app.id, "employer-e").await.unwrap().unwrap();
        assert_eq!(stored.status, ApplicationStatus::Submitted);
        assert!(f.store.list_notifications("seeker-s").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transition_unknown_application_is_not_found() {
        let f = fixture().await;
        let res = f
            .applications
            .transition("nope", "employer-e", ApplicationStatus::UnderReview)
            .await;
        assert!(matches!(res, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_transition_back_to_submitted_is_rejected() {
        let f = fixture().await;
        let app = f.applications.submit(&f.job.id, "seeker-s", None).await.unwrap();
        let res = f
            .applications
            .transition(&app.id, "employer-e", ApplicationStatus::Submitted)
            .await;
        assert!(matches!(res, Err(AppError::Validation(_))));
    }

    /// Repeating a transition, or leaving a final status, is allowed and
    /// notifies the seeker each time.
    #[tokio::test]
    async fn test_repeated_and_post_final_transitions_notify_each_time() {
        let f = fixture().await;
        let app = f.applications.submit(&f.job.id, "seeker-s", None).await.unwrap();

        for status in [
            ApplicationStatus::Shortlisted,
            ApplicationStatus::Shortlisted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Hired,
        ] {
            f.applications.transition(&app.id, "employer-e", status).await.unwrap();
        }

        let stored = f.store.find_owned_application(&app.id, "employer-e").await.unwrap().unwrap();
        assert_eq!(stored.status, ApplicationStatus::Hired);
        let notes = f.store.list_notifications("seeker-s").await.unwrap();
        assert_eq!(notes.len(), 4);
        assert_eq!(notes[0].message, "Congratulations! You have been hired");
    }

    #[tokio::test]
    async fn test_list_for_job_requires_ownership() {
        let f = fixture().await;
        f.applications.submit(&f.job.id, "seeker-s", None).await.unwrap();

        assert_eq!(f.applications.list_for_job(&f.job.id, "employer-e").await.unwrap().len(), 1);
        assert_eq!(
            f.applications.list_for_job(&f.job.id, "employer-other").await,
            Err(AppError::JobNotFound)
        );
        assert_eq!(f.applications.list_for_seeker("seeker-s").await.unwrap().len(), 1);
    }
}
