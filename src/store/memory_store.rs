use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Store, StoreError};
use crate::models::{
    ApplicationStatus, Engagement, EngagementKind, Job, JobApplication, Notification, User,
};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    /// email -> user id
    user_emails: HashMap<String, String>,
    jobs: HashMap<String, Job>,
    applications: HashMap<String, JobApplication>,
    application_pairs: HashSet<(String, String)>,
    engagements: Vec<Engagement>,
    toggle_keys: HashSet<(String, String, EngagementKind)>,
    notifications: Vec<Notification>,
}

/// A process-local store. Every method runs under a single lock guard, so
/// compound writes are atomic and the uniqueness indexes can't be raced.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        if t.user_emails.contains_key(&user.email) {
            return Err(StoreError::Duplicate(format!("users.email={}", user.email)));
        }
        t.user_emails.insert(user.email.clone(), user.id.clone());
        t.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.user_emails.get(email).and_then(|id| t.users.get(id)).cloned())
    }

    async fn find_active_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users.get(id).filter(|u| u.is_active).cloned())
    }

    async fn set_user_active(&self, id: &str, active: bool) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        match t.users.get_mut(id) {
            Some(user) => {
                user.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_job(&self, job: &Job) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        t.jobs.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn find_job(&self, id: &str) -> Result<Option<Job>, StoreError> {
        Ok(self.tables.read().await.jobs.get(id).cloned())
    }

    async fn list_visible_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let t = self.tables.read().await;
        let mut jobs: Vec<Job> = t.jobs.values().filter(|j| j.is_visible()).cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn set_job_approved(&self, id: &str, approved: bool) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        match t.jobs.get_mut(id) {
            Some(job) => {
                job.is_approved = approved;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_application_by_pair(
        &self,
        job_id: &str,
        job_seeker_id: &str,
    ) -> Result<Option<JobApplication>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.applications
            .values()
            .find(|a| a.job_id == job_id && a.job_seeker_id == job_seeker_id)
            .cloned())
    }

    async fn insert_application(
        &self,
        application: &JobApplication,
        notification: &Notification,
    ) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        let pair = (application.job_id.clone(), application.job_seeker_id.clone());
        if t.application_pairs.contains(&pair) {
            return Err(StoreError::Duplicate(format!(
                "applications(job_id={}, job_seeker_id={})",
                pair.0, pair.1
            )));
        }
        t.application_pairs.insert(pair);
        t.applications.insert(application.id.clone(), application.clone());
        t.notifications.push(notification.clone());
        Ok(())
    }

    async fn find_owned_application(
        &self,
        application_id: &str,
        employer_id: &str,
    ) -> Result<Option<JobApplication>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.applications
            .get(application_id)
            .filter(|a| {
                t.jobs
                    .get(&a.job_id)
                    .is_some_and(|job| job.employer_id == employer_id)
            })
            .cloned())
    }

    async fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
        updated_at: DateTime<Utc>,
        notification: &Notification,
    ) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        match t.applications.get_mut(application_id) {
            Some(application) => {
                application.status = status;
                application.updated_at = updated_at;
            }
            None => return Ok(false),
        }
        t.notifications.push(notification.clone());
        Ok(true)
    }

    async fn list_applications_for_seeker(
        &self,
        job_seeker_id: &str,
    ) -> Result<Vec<JobApplication>, StoreError> {
        let t = self.tables.read().await;
        let mut apps: Vec<JobApplication> = t
            .applications
            .values()
            .filter(|a| a.job_seeker_id == job_seeker_id)
            .cloned()
            .collect();
        apps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(apps)
    }

    async fn list_applications_for_job(&self, job_id: &str) -> Result<Vec<JobApplication>, StoreError> {
        let t = self.tables.read().await;
        let mut apps: Vec<JobApplication> = t
            .applications
            .values()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect();
        apps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(apps)
    }

    async fn find_engagement(
        &self,
        job_id: &str,
        user_id: &str,
        kind: EngagementKind,
    ) -> Result<Option<Engagement>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.engagements
            .iter()
            .find(|e| e.job_id == job_id && e.user_id == user_id && e.kind == kind)
            .cloned())
    }

    async fn insert_engagement(&self, engagement: &Engagement) -> Result<(), StoreError> {
        let mut t = self.tables.write().await;
        if engagement.kind.is_toggle() {
            let key = (
                engagement.job_id.clone(),
                engagement.user_id.clone(),
                engagement.kind,
            );
            if !t.toggle_keys.insert(key) {
                return Err(StoreError::Duplicate(format!(
                    "engagements(job_id={}, user_id={}, kind={})",
                    engagement.job_id, engagement.user_id, engagement.kind
                )));
            }
        }
        t.engagements.push(engagement.clone());
        Ok(())
    }

    async fn delete_engagement(
        &self,
        job_id: &str,
        user_id: &str,
        kind: EngagementKind,
    ) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        let position = t
            .engagements
            .iter()
            .position(|e| e.job_id == job_id && e.user_id == user_id && e.kind == kind);
        match position {
            Some(idx) => {
                t.engagements.remove(idx);
                t.toggle_keys
                    .remove(&(job_id.to_string(), user_id.to_string(), kind));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_engagements(&self, job_id: &str) -> Result<Vec<Engagement>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.engagements
            .iter()
            .filter(|e| e.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>, StoreError> {
        let t = self.tables.read().await;
        // Stored in insertion order, so reversing gives newest first even
        // when two notifications share a timestamp.
        Ok(t.notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        match t
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn user(email: &str) -> User {
        User::new(email, "hash".to_string(), "Test".to_string(), Role::JobSeeker)
    }

    /// Test that a second user with the same email is rejected as a duplicate.
    #[tokio::test]
    async fn test_email_is_unique() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@example.com")).await.unwrap();
        let res = store.insert_user(&user("a@example.com")).await;
        assert!(matches!(res, Err(StoreError::Duplicate(_))));
    }

    /// Test that deactivated users are invisible to the active lookup.
    #[tokio::test]
    async fn test_find_active_user_filters_inactive() {
        let store = MemoryStore::new();
        let u = user("b@example.com");
        store.insert_user(&u).await.unwrap();
        assert!(store.find_active_user(&u.id).await.unwrap().is_some());

        assert!(store.set_user_active(&u.id, false).await.unwrap());
        assert!(store.find_active_user(&u.id).await.unwrap().is_none());
        assert!(!store.set_user_active("missing", false).await.unwrap());
    }

    /// Test that the (job, seeker) pair is unique and a rejected insert writes
    /// neither the application nor its notification.
    #[tokio::test]
    async fn test_application_pair_is_unique_and_atomic() {
        let store = MemoryStore::new();
        let job = Job::new("employer", "Title".to_string(), "d".to_string(), None);
        store.insert_job(&job).await.unwrap();

        let first = JobApplication::new(&job.id, "seeker", None);
        store
            .insert_application(&first, &Notification::new_application(&job, &first))
            .await
            .unwrap();

        let second = JobApplication::new(&job.id, "seeker", None);
        let res = store
            .insert_application(&second, &Notification::new_application(&job, &second))
            .await;
        assert!(matches!(res, Err(StoreError::Duplicate(_))));

        assert_eq!(store.list_applications_for_job(&job.id).await.unwrap().len(), 1);
        assert_eq!(store.list_notifications("employer").await.unwrap().len(), 1);
    }

    /// Test that toggle kinds are unique per (job, user, kind) while comments are not.
    #[tokio::test]
    async fn test_engagement_uniqueness_applies_to_toggle_kinds_only() {
        let store = MemoryStore::new();
        let like = Engagement::new("job", "user", EngagementKind::Like, None);
        store.insert_engagement(&like).await.unwrap();
        let again = Engagement::new("job", "user", EngagementKind::Like, None);
        assert!(matches!(
            store.insert_engagement(&again).await,
            Err(StoreError::Duplicate(_))
        ));

        for _ in 0..3 {
            let c = Engagement::new("job", "user", EngagementKind::Comment, Some("hi".to_string()));
            store.insert_engagement(&c).await.unwrap();
        }
        assert_eq!(store.list_engagements("job").await.unwrap().len(), 4);

        assert!(store
            .delete_engagement("job", "user", EngagementKind::Like)
            .await
            .unwrap());
        // The key is released, so the like can be added again.
        store.insert_engagement(&again).await.unwrap();
    }

    /// Test that the ownership lookup goes through the job's employer.
    #[tokio::test]
    async fn test_find_owned_application_joins_through_job() {
        let store = MemoryStore::new();
        let job = Job::new("owner", "Title".to_string(), "d".to_string(), None);
        store.insert_job(&job).await.unwrap();
        let app = JobApplication::new(&job.id, "seeker", None);
        store
            .insert_application(&app, &Notification::new_application(&job, &app))
            .await
            .unwrap();

        assert!(store.find_owned_application(&app.id, "owner").await.unwrap().is_some());
        assert!(store.find_owned_application(&app.id, "someone-else").await.unwrap().is_none());
    }

    /// Test that only the recipient can mark a notification read.
    #[tokio::test]
    async fn test_mark_notification_read_checks_recipient() {
        let store = MemoryStore::new();
        let job = Job::new("owner", "Title".to_string(), "d".to_string(), None);
        let app = JobApplication::new(&job.id, "seeker", None);
        let n = Notification::new_application(&job, &app);
        store.insert_application(&app, &n).await.unwrap();

        assert!(!store.mark_notification_read(&n.id, "seeker").await.unwrap());
        assert!(store.mark_notification_read(&n.id, "owner").await.unwrap());
        assert!(store.list_notifications("owner").await.unwrap()[0].is_read);
    }
}
