use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, FindOptions, IndexOptions};
use mongodb::{Client, ClientSession, Collection, Cursor, IndexModel};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Store, StoreError};
use crate::models::{
    timestamp, ApplicationStatus, Engagement, EngagementKind, Job, JobApplication, Notification,
    User,
};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// The config struct for MongoDB connections.
/// Contains the URI and database name.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct MongoDBConfig {
    pub uri: String,
    pub database: String,
}

/// A `Store` backed by MongoDB.
///
/// Uniqueness rules are unique indexes, so a racing duplicate write fails
/// with error 11000 and is reported as [`StoreError::Duplicate`]. Paired
/// writes run in a multi-document transaction, which needs a replica set.
pub struct MongoDBStore {
    client: Client,
    users: Collection<User>,
    jobs: Collection<Job>,
    applications: Collection<JobApplication>,
    engagements: Collection<Engagement>,
    notifications: Collection<Notification>,
}

fn backend(context: &str) -> impl Fn(mongodb::error::Error) -> StoreError + '_ {
    move |e| StoreError::Backend(format!("{}: {}", context, e))
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(ce) => ce.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// Maps a write error, keeping duplicate-key violations distinguishable.
fn write_error(context: &str, e: mongodb::error::Error) -> StoreError {
    if is_duplicate_key(&e) {
        StoreError::Duplicate(context.to_string())
    } else {
        StoreError::Backend(format!("{}: {}", context, e))
    }
}

fn unique_index(keys: Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn collect<T>(cursor: Cursor<T>, context: &str) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    cursor.try_collect().await.map_err(backend(context))
}

fn newest_first() -> FindOptions {
    FindOptions::builder().sort(doc! { "created_at": -1 }).build()
}

/// A failed abort is only logged: the server discards the transaction once
/// the session ends.
async fn abort(session: &mut ClientSession) {
    if let Err(e) = session.abort_transaction().await {
        warn!(error = %e, "Failed to abort MongoDB transaction");
    }
}

impl MongoDBStore {
    /// Creates a new `MongoDBStore` from the given config.
    /// It initializes client connections and sets up indexes.
    pub async fn new(config: &MongoDBConfig) -> Result<Self, StoreError> {
        info!("Connecting to MongoDB database '{}'", config.database);

        let mut client_options = ClientOptions::parse(&config.uri)
            .await
            .map_err(backend("Failed to parse MongoDB URI"))?;
        client_options.app_name = Some("jobboard".to_string());

        let client = Client::with_options(client_options)
            .map_err(backend("Failed to create MongoDB client"))?;
        let database = client.database(&config.database);

        let store = Self {
            users: database.collection("users"),
            jobs: database.collection("jobs"),
            applications: database.collection("applications"),
            engagements: database.collection("engagements"),
            notifications: database.collection("notifications"),
            client,
        };
        store.create_indexes().await?;

        info!("MongoDB connection established successfully.");
        Ok(store)
    }

    async fn create_indexes(&self) -> Result<(), StoreError> {
        self.users
            .create_index(unique_index(doc! { "id": 1 }), None)
            .await
            .map_err(backend("Failed to create unique index on users.id"))?;
        self.users
            .create_index(unique_index(doc! { "email": 1 }), None)
            .await
            .map_err(backend("Failed to create unique index on users.email"))?;
        self.jobs
            .create_index(unique_index(doc! { "id": 1 }), None)
            .await
            .map_err(backend("Failed to create unique index on jobs.id"))?;
        self.applications
            .create_index(unique_index(doc! { "id": 1 }), None)
            .await
            .map_err(backend("Failed to create unique index on applications.id"))?;
        self.applications
            .create_index(unique_index(doc! { "job_id": 1, "job_seeker_id": 1 }), None)
            .await
            .map_err(backend(
                "Failed to create unique index on applications(job_id, job_seeker_id)",
            ))?;

        // Comments are append-only, so the (job, user, kind) key only
        // applies to the toggle kinds.
        let toggle_kinds: Vec<&str> = EngagementKind::TOGGLE_KINDS
            .iter()
            .map(|k| k.as_str())
            .collect();
        let toggle_index = IndexModel::builder()
            .keys(doc! { "job_id": 1, "user_id": 1, "kind": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(doc! { "kind": { "$in": toggle_kinds } })
                    .build(),
            )
            .build();
        self.engagements
            .create_index(toggle_index, None)
            .await
            .map_err(backend(
                "Failed to create unique index on engagements(job_id, user_id, kind)",
            ))?;

        self.notifications
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "created_at": -1 })
                    .build(),
                None,
            )
            .await
            .map_err(backend("Failed to create index on notifications.user_id"))?;
        Ok(())
    }

    async fn start_transaction(&self) -> Result<ClientSession, StoreError> {
        let mut session = self
            .client
            .start_session(None)
            .await
            .map_err(backend("Failed to start session"))?;
        session
            .start_transaction(None)
            .await
            .map_err(backend("Failed to start transaction"))?;
        Ok(session)
    }
}

#[async_trait]
impl Store for MongoDBStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.users
            .insert_one(user, None)
            .await
            .map_err(|e| write_error("users.email", e))?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.users
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(backend("Failed to query user by email"))
    }

    async fn find_active_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.users
            .find_one(doc! { "id": id, "is_active": true }, None)
            .await
            .map_err(backend("Failed to query user by id"))
    }

    async fn set_user_active(&self, id: &str, active: bool) -> Result<bool, StoreError> {
        let res = self
            .users
            .update_one(doc! { "id": id }, doc! { "$set": { "is_active": active } }, None)
            .await
            .map_err(backend("Failed to update user"))?;
        Ok(res.matched_count > 0)
    }

    async fn insert_job(&self, job: &Job) -> Result<(), StoreError> {
        self.jobs
            .insert_one(job, None)
            .await
            .map_err(|e| write_error("jobs.id", e))?;
        Ok(())
    }

    async fn find_job(&self, id: &str) -> Result<Option<Job>, StoreError> {
        self.jobs
            .find_one(doc! { "id": id }, None)
            .await
            .map_err(backend("Failed to query job"))
    }

    async fn list_visible_jobs(&self) -> Result<Vec<Job>, StoreError> {
        let cursor = self
            .jobs
            .find(doc! { "is_active": true, "is_approved": true }, newest_first())
            .await
            .map_err(backend("Failed to list jobs"))?;
        collect(cursor, "Failed to read job document").await
    }

    async fn set_job_approved(&self, id: &str, approved: bool) -> Result<bool, StoreError> {
        let res = self
            .jobs
            .update_one(doc! { "id": id }, doc! { "$set": { "is_approved": approved } }, None)
            .await
            .map_err(backend("Failed to update job"))?;
        Ok(res.matched_count > 0)
    }

    async fn find_application_by_pair(
        &self,
        job_id: &str,
        job_seeker_id: &str,
    ) -> Result<Option<JobApplication>, StoreError> {
        self.applications
            .find_one(doc! { "job_id": job_id, "job_seeker_id": job_seeker_id }, None)
            .await
            .map_err(backend("Failed to query application"))
    }

    async fn insert_application(
        &self,
        application: &JobApplication,
        notification: &Notification,
    ) -> Result<(), StoreError> {
        let mut session = self.start_transaction().await?;

        if let Err(e) = self
            .applications
            .insert_one_with_session(application, None, &mut session)
            .await
        {
            abort(&mut session).await;
            return Err(write_error("applications(job_id, job_seeker_id)", e));
        }
        if let Err(e) = self
            .notifications
            .insert_one_with_session(notification, None, &mut session)
            .await
        {
            abort(&mut session).await;
            return Err(write_error("notifications.id", e));
        }

        session
            .commit_transaction()
            .await
            .map_err(|e| write_error("applications(job_id, job_seeker_id)", e))?;
        debug!(application_id = %application.id, "Application and notification committed");
        Ok(())
    }

    async fn find_owned_application(
        &self,
        application_id: &str,
        employer_id: &str,
    ) -> Result<Option<JobApplication>, StoreError> {
        let Some(application) = self
            .applications
            .find_one(doc! { "id": application_id }, None)
            .await
            .map_err(backend("Failed to query application"))?
        else {
            return Ok(None);
        };

        let owned = self
            .jobs
            .find_one(
                doc! { "id": application.job_id.as_str(), "employer_id": employer_id },
                None,
            )
            .await
            .map_err(backend("Failed to query job owner"))?
            .is_some();

        Ok(owned.then_some(application))
    }

    async fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
        updated_at: DateTime<Utc>,
        notification: &Notification,
    ) -> Result<bool, StoreError> {
        let updated_at = timestamp::encode(&updated_at);
        let mut session = self.start_transaction().await?;

        let res = match self
            .applications
            .update_one_with_session(
                doc! { "id": application_id },
                doc! { "$set": { "status": status.as_str(), "updated_at": updated_at } },
                None,
                &mut session,
            )
            .await
        {
            Ok(res) => res,
            Err(e) => {
                abort(&mut session).await;
                return Err(StoreError::Backend(format!("Failed to update application: {}", e)));
            }
        };
        if res.matched_count == 0 {
            abort(&mut session).await;
            return Ok(false);
        }

        if let Err(e) = self
            .notifications
            .insert_one_with_session(notification, None, &mut session)
            .await
        {
            abort(&mut session).await;
            return Err(write_error("notifications.id", e));
        }

        session
            .commit_transaction()
            .await
            .map_err(backend("Failed to commit status update"))?;
        Ok(true)
    }

    async fn list_applications_for_seeker(
        &self,
        job_seeker_id: &str,
    ) -> Result<Vec<JobApplication>, StoreError> {
        let cursor = self
            .applications
            .find(doc! { "job_seeker_id": job_seeker_id }, newest_first())
            .await
            .map_err(backend("Failed to list applications"))?;
        collect(cursor, "Failed to read application document").await
    }

    async fn list_applications_for_job(&self, job_id: &str) -> Result<Vec<JobApplication>, StoreError> {
        let cursor = self
            .applications
            .find(doc! { "job_id": job_id }, newest_first())
            .await
            .map_err(backend("Failed to list applications"))?;
        collect(cursor, "Failed to read application document").await
    }

    async fn find_engagement(
        &self,
        job_id: &str,
        user_id: &str,
        kind: EngagementKind,
    ) -> Result<Option<Engagement>, StoreError> {
        self.engagements
            .find_one(
                doc! { "job_id": job_id, "user_id": user_id, "kind": kind.as_str() },
                None,
            )
            .await
            .map_err(backend("Failed to query engagement"))
    }

    async fn insert_engagement(&self, engagement: &Engagement) -> Result<(), StoreError> {
        self.engagements
            .insert_one(engagement, None)
            .await
            .map_err(|e| write_error("engagements(job_id, user_id, kind)", e))?;
        Ok(())
    }

    async fn delete_engagement(
        &self,
        job_id: &str,
        user_id: &str,
        kind: EngagementKind,
    ) -> Result<bool, StoreError> {
        let res = self
            .engagements
            .delete_one(
                doc! { "job_id": job_id, "user_id": user_id, "kind": kind.as_str() },
                None,
            )
            .await
            .map_err(backend("Failed to delete engagement"))?;
        Ok(res.deleted_count > 0)
    }

    async fn list_engagements(&self, job_id: &str) -> Result<Vec<Engagement>, StoreError> {
        let cursor = self
            .engagements
            .find(doc! { "job_id": job_id }, None)
            .await
            .map_err(backend("Failed to list engagements"))?;
        collect(cursor, "Failed to read engagement document").await
    }

    async fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>, StoreError> {
        let cursor = self
            .notifications
            .find(doc! { "user_id": user_id }, newest_first())
            .await
            .map_err(backend("Failed to list notifications"))?;
        collect(cursor, "Failed to read notification document").await
    }

    async fn mark_notification_read(&self, id: &str, user_id: &str) -> Result<bool, StoreError> {
        let res = self
            .notifications
            .update_one(
                doc! { "id": id, "user_id": user_id },
                doc! { "$set": { "is_read": true } },
                None,
            )
            .await
            .map_err(backend("Failed to update notification"))?;
        Ok(res.matched_count > 0)
    }
}
