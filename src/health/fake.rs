use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::calendar::DayBounds;

use super::{DailySum, GatewayError, HealthDataGateway, SampleType};

type Scripted<T> = (Duration, Result<T, GatewayError>);

/// Scriptable gateway. Queued responses are served in order; once a queue
/// is empty the fallback value answers immediately.
pub(crate) struct FakeGateway {
    available: AtomicBool,
    authorization: Mutex<VecDeque<Result<bool, GatewayError>>>,
    daily: Mutex<VecDeque<Scripted<Option<u64>>>>,
    weekly: Mutex<VecDeque<Scripted<Vec<(usize, u64)>>>>,
    daily_fallback: Mutex<Option<u64>>,
    weekly_fallback: Mutex<Vec<(usize, u64)>>,
    pub authorization_calls: AtomicUsize,
    pub daily_calls: AtomicUsize,
    pub weekly_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            authorization: Mutex::new(VecDeque::new()),
            daily: Mutex::new(VecDeque::new()),
            weekly: Mutex::new(VecDeque::new()),
            daily_fallback: Mutex::new(None),
            weekly_fallback: Mutex::new(Vec::new()),
            authorization_calls: AtomicUsize::new(0),
            daily_calls: AtomicUsize::new(0),
            weekly_calls: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        let gateway = Self::new();
        gateway.available.store(false, Ordering::SeqCst);
        gateway
    }

    pub fn with_daily(self, count: Option<u64>) -> Self {
        *self.daily_fallback.lock().unwrap() = count;
        self
    }

    /// `(day index, count)` pairs; other days are omitted from the answer.
    pub fn with_weekly(self, counts: Vec<(usize, u64)>) -> Self {
        *self.weekly_fallback.lock().unwrap() = counts;
        self
    }

    pub fn push_authorization(&self, result: Result<bool, GatewayError>) {
        self.authorization.lock().unwrap().push_back(result);
    }

    pub fn push_daily(&self, delay: Duration, result: Result<Option<u64>, GatewayError>) {
        self.daily.lock().unwrap().push_back((delay, result));
    }

    pub fn push_weekly(&self, delay: Duration, result: Result<Vec<(usize, u64)>, GatewayError>) {
        self.weekly.lock().unwrap().push_back((delay, result));
    }

    pub fn daily_calls(&self) -> usize {
        self.daily_calls.load(Ordering::SeqCst)
    }

    pub fn weekly_calls(&self) -> usize {
        self.weekly_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HealthDataGateway for FakeGateway {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn request_read_authorization(&self, _read: &[SampleType]) -> Result<bool, GatewayError> {
        self.authorization_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.authorization.lock().unwrap().pop_front();
        scripted.unwrap_or(Ok(true))
    }

    async fn query_cumulative_sum(
        &self,
        _sample_type: SampleType,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Option<u64>, GatewayError> {
        self.daily_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.daily.lock().unwrap().pop_front();
        match scripted {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => {
                let fallback = *self.daily_fallback.lock().unwrap();
                Ok(fallback)
            }
        }
    }

    async fn query_daily_sums(
        &self,
        _sample_type: SampleType,
        days: &[DayBounds],
    ) -> Result<Vec<DailySum>, GatewayError> {
        self.weekly_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.weekly.lock().unwrap().pop_front();
        let counts = match scripted {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result?
            }
            None => {
                let fallback = self.weekly_fallback.lock().unwrap().clone();
                fallback
            }
        };

        Ok(counts
            .into_iter()
            .filter_map(|(index, count)| {
                days.get(index).map(|day| DailySum {
                    start: day.start,
                    end: day.end,
                    count: Some(count),
                })
            })
            .collect())
    }
}
