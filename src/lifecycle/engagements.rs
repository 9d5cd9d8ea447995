use std::sync::Arc;

use tracing::debug;

use crate::error::AppError;
use crate::models::{EngageOutcome, Engagement, EngagementKind};
use crate::store::{Store, StoreError};

/// Per-user engagement with a job: like, favorite and interest toggle on
/// and off, comments accumulate.
pub struct Engagements {
    store: Arc<dyn Store>,
}

impl Engagements {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Engagements { store }
    }

    /// `kind` arrives as the raw request value and is checked before any
    /// storage access, so an unknown kind never produces a row.
    pub async fn engage(
        &self,
        job_id: &str,
        user_id: &str,
        kind: &str,
        content: Option<String>,
    ) -> Result<EngageOutcome, AppError> {
        let kind: EngagementKind = kind.parse().map_err(|_| AppError::InvalidKind)?;

        let content = content.filter(|c| !c.trim().is_empty());
        if kind == EngagementKind::Comment && content.is_none() {
            return Err(AppError::validation("Comment content is required"));
        }

        // Same visibility rule as reading the job: a hidden posting answers
        // JobNotFound here too.
        match self.store.find_job(job_id).await? {
            Some(job) if job.is_visible() => {}
            _ => return Err(AppError::JobNotFound),
        }

        let outcome = if kind.is_toggle() {
            self.toggle(job_id, user_id, kind).await?
        } else {
            self.store
                .insert_engagement(&Engagement::new(job_id, user_id, kind, content))
                .await?;
            EngageOutcome::Added
        };

        debug!(job_id = %job_id, user_id = %user_id, kind = %kind, outcome = outcome.as_str(), "Engagement recorded");
        Ok(outcome)
    }

    /// Check-then-act on (job, user, kind). The store's unique key settles
    /// races: an insert that collides means the row is already there, so the
    /// request is treated as a removal; a delete that finds nothing means a
    /// racing request already removed it.
    async fn toggle(
        &self,
        job_id: &str,
        user_id: &str,
        kind: EngagementKind,
    ) -> Result<EngageOutcome, AppError> {
        if self.store.find_engagement(job_id, user_id, kind).await?.is_some() {
            self.store.delete_engagement(job_id, user_id, kind).await?;
            return Ok(EngageOutcome::Removed);
        }

        match self
            .store
            .insert_engagement(&Engagement::new(job_id, user_id, kind, None))
            .await
        {
            Ok(()) => Ok(EngageOutcome::Added),
            Err(StoreError::Duplicate(_)) => {
                debug!(job_id = %job_id, user_id = %user_id, kind = %kind, "Engagement insert collided; removing instead");
                self.store.delete_engagement(job_id, user_id, kind).await?;
                Ok(EngageOutcome::Removed)
            }
            Err(e) => Err(e.into()),
        }
    }
}
