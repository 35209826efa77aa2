use std::{path::Path, str::FromStr};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::DayBounds;
use crate::db::Database;
use crate::models::{AuthorizationState, StepSample};

use super::{DailySum, GatewayError, HealthDataGateway, SampleType};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Answer the local store gives to a read-authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessPolicy {
    Grant,
    Deny,
}

impl FromStr for AccessPolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grant" | "granted" | "allow" => Ok(AccessPolicy::Grant),
            "deny" | "denied" => Ok(AccessPolicy::Deny),
            other => Err(anyhow!("unknown health access policy '{other}'")),
        }
    }
}

/// Health gateway backed by the local sample database.
#[derive(Clone)]
pub struct LocalHealthStore {
    db: Database,
    policy: AccessPolicy,
}

impl LocalHealthStore {
    pub fn new(db: Database, policy: AccessPolicy) -> Self {
        Self { db, policy }
    }

    /// Loads a JSON array of samples and stores the ones not seen before.
    pub async fn import_samples(&self, path: &Path) -> Result<usize> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read samples from {}", path.display()))?;
        let samples: Vec<StepSample> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse samples in {}", path.display()))?;

        let inserted = self.db.insert_samples(samples).await?;
        log_info!("Imported {} step samples from {}", inserted, path.display());
        Ok(inserted)
    }

    pub async fn record_samples(&self, samples: Vec<StepSample>) -> Result<usize> {
        self.db.insert_samples(samples).await
    }

    /// Withdraws read access, as if the user revoked it outside the app.
    pub async fn revoke(&self, sample_type: SampleType) -> Result<()> {
        log_warn!("Read access to {} revoked", sample_type.identifier());
        self.db
            .set_authorization(sample_type, AuthorizationState::Denied)
            .await
    }

    async fn ensure_authorized(&self, sample_type: SampleType) -> Result<(), GatewayError> {
        let record = self.db.get_authorization(sample_type).await?;
        match record.map(|r| r.status) {
            Some(AuthorizationState::Granted) => Ok(()),
            _ => Err(GatewayError::NotAuthorized(sample_type.identifier().into())),
        }
    }
}

#[async_trait]
impl HealthDataGateway for LocalHealthStore {
    fn is_available(&self) -> bool {
        true
    }

    async fn request_read_authorization(&self, read: &[SampleType]) -> Result<bool, GatewayError> {
        let decision = match self.policy {
            AccessPolicy::Grant => AuthorizationState::Granted,
            AccessPolicy::Deny => AuthorizationState::Denied,
        };

        for sample_type in read {
            self.db.set_authorization(*sample_type, decision).await?;
        }

        Ok(decision.is_granted())
    }

    async fn query_cumulative_sum(
        &self,
        sample_type: SampleType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<u64>, GatewayError> {
        self.ensure_authorized(sample_type).await?;
        if end < start {
            return Err(GatewayError::Query(format!(
                "interval end {end} precedes start {start}"
            )));
        }
        Ok(self.db.sum_samples(start, end).await?)
    }

    async fn query_daily_sums(
        &self,
        sample_type: SampleType,
        days: &[DayBounds],
    ) -> Result<Vec<DailySum>, GatewayError> {
        self.ensure_authorized(sample_type).await?;
        let (Some(first), Some(last)) = (days.first(), days.last()) else {
            return Ok(Vec::new());
        };

        let samples = self.db.list_samples(first.start, last.end).await?;

        Ok(days
            .iter()
            .map(|day| {
                let mut in_day = samples.iter().filter(|s| day.contains(s.start)).peekable();
                let count = in_day.peek().is_some().then(|| in_day.map(|s| s.count).sum());
                DailySum {
                    start: day.start,
                    end: day.end,
                    count,
                }
            })
            .collect())
    }
}
