//! Health-data gateway seam.
//!
//! The tracker only talks to [`HealthDataGateway`]. `LocalHealthStore` backs it
//! with the on-disk sample database; tests use a scripted fake.

pub mod local;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::DayBounds;

pub use local::{AccessPolicy, LocalHealthStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SampleType {
    StepCount,
}

impl SampleType {
    pub fn identifier(&self) -> &'static str {
        match self {
            SampleType::StepCount => "step_count",
        }
    }
}

/// One bucket of a collection query. `count` is `None` when the bucket had
/// no samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySum {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub count: Option<u64>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("health data is not available on this device")]
    Unavailable,
    #[error("read access to {0} has not been granted")]
    NotAuthorized(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("health store error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for GatewayError {
    fn from(err: anyhow::Error) -> Self {
        GatewayError::Storage(format!("{err:#}"))
    }
}

#[async_trait]
pub trait HealthDataGateway: Send + Sync {
    fn is_available(&self) -> bool;

    /// Asks for read-only access to `read`. Nothing is ever shared back.
    async fn request_read_authorization(&self, read: &[SampleType]) -> Result<bool, GatewayError>;

    /// Cumulative sum over samples starting inside `[start, end)`.
    async fn query_cumulative_sum(
        &self,
        sample_type: SampleType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<u64>, GatewayError>;

    /// One cumulative sum per day interval. Days without samples may be
    /// reported with `count: None` or omitted entirely.
    async fn query_daily_sums(
        &self,
        sample_type: SampleType,
        days: &[DayBounds],
    ) -> Result<Vec<DailySum>, GatewayError>;
}
