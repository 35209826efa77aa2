use std::sync::Arc;

use chrono::Utc;
use tokio::{
    sync::{mpsc, oneshot, watch, Mutex},
    task::JoinHandle,
    time::Duration,
};

use crate::calendar::{today_interval, week_range, Clock, SystemClock};
use crate::health::{GatewayError, HealthDataGateway, SampleType};
use crate::models::{AuthorizationState, DailyStepCount, WeeklyStepCounts};
use crate::settings::SettingsStore;

use super::error::TrackerError;
use super::loop_worker::PeriodicRefresh;
use super::state::{DiagnosticKind, RefreshKind, RefreshOutcome, RequestSequencer, TrackerState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

type AuthorizationReply = oneshot::Sender<Result<AuthorizationState, TrackerError>>;
type RefreshReply = Option<oneshot::Sender<RefreshOutcome>>;

pub(crate) enum TrackerCommand {
    RequestAuthorization {
        reply: AuthorizationReply,
    },
    AuthorizationCompleted {
        result: Result<bool, GatewayError>,
        reply: AuthorizationReply,
    },
    Refresh {
        kind: RefreshKind,
        reply: RefreshReply,
    },
    DailyCompleted {
        seq: u64,
        result: Result<DailyStepCount, GatewayError>,
        reply: RefreshReply,
    },
    WeeklyCompleted {
        seq: u64,
        result: Result<WeeklyStepCounts, GatewayError>,
        reply: RefreshReply,
    },
    StartPeriodicRefresh {
        reply: oneshot::Sender<bool>,
    },
    Shutdown,
}

#[derive(Clone)]
pub struct TrackerOptions {
    pub refresh_interval: Duration,
    pub clock: Arc<dyn Clock>,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            clock: Arc::new(SystemClock),
        }
    }
}

/// Cloneable handle to the step tracker.
///
/// All state lives in a single actor task that drains one command queue.
/// Gateway calls run in their own tasks and post their results back to that
/// queue, so state is only ever written from one place. Readers observe it
/// through [`StepTracker::subscribe`].
#[derive(Clone)]
pub struct StepTracker {
    commands: mpsc::UnboundedSender<TrackerCommand>,
    snapshots: watch::Receiver<TrackerState>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl StepTracker {
    pub fn spawn(
        gateway: Arc<dyn HealthDataGateway>,
        settings: Arc<SettingsStore>,
        options: TrackerOptions,
    ) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let (publisher, snapshots) = watch::channel(TrackerState::new());

        let actor = TrackerActor {
            receiver,
            commands: commands.downgrade(),
            gateway,
            settings,
            clock: options.clock,
            refresh_interval: options.refresh_interval,
            state: TrackerState::new(),
            sequencer: RequestSequencer::default(),
            publisher,
            periodic: None,
        };

        let worker = tokio::spawn(actor.run());

        Self {
            commands,
            snapshots,
            worker: Arc::new(Mutex::new(Some(worker))),
        }
    }

    pub fn snapshot(&self) -> TrackerState {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.snapshots.clone()
    }

    /// Asks for read access to step counts. On success both totals are
    /// refreshed and the periodic refresh starts.
    pub async fn request_authorization(&self) -> Result<AuthorizationState, TrackerError> {
        self.call(|reply| TrackerCommand::RequestAuthorization { reply })
            .await?
    }

    /// Re-queries today's total. Failures keep the previous value.
    pub async fn refresh_daily(&self) -> Result<RefreshOutcome, TrackerError> {
        self.refresh(RefreshKind::Daily).await
    }

    /// Re-queries this week's per-day totals. Failures keep the previous value.
    pub async fn refresh_weekly(&self) -> Result<RefreshOutcome, TrackerError> {
        self.refresh(RefreshKind::Weekly).await
    }

    pub async fn refresh_all(&self) -> Result<(RefreshOutcome, RefreshOutcome), TrackerError> {
        let (daily, weekly) = tokio::join!(self.refresh_daily(), self.refresh_weekly());
        Ok((daily?, weekly?))
    }

    /// Starts the repeating refresh. Returns `false` when it was already running.
    pub async fn start_periodic_refresh(&self) -> Result<bool, TrackerError> {
        self.call(|reply| TrackerCommand::StartPeriodicRefresh { reply })
            .await
    }

    /// Stops the tracker and its periodic refresh. Later calls fail with
    /// [`TrackerError::Stopped`].
    pub async fn shutdown(&self) {
        let _ = self.commands.send(TrackerCommand::Shutdown);
        if let Some(handle) = self.worker.lock().await.take() {
            if let Err(err) = handle.await {
                log_error!("step tracker task failed to join: {err}");
            }
        }
    }

    async fn refresh(&self, kind: RefreshKind) -> Result<RefreshOutcome, TrackerError> {
        self.call(|reply| TrackerCommand::Refresh {
            kind,
            reply: Some(reply),
        })
        .await
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> TrackerCommand,
    ) -> Result<T, TrackerError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(build(reply))
            .map_err(|_| TrackerError::Stopped)?;
        rx.await.map_err(|_| TrackerError::Stopped)
    }
}

struct TrackerActor {
    receiver: mpsc::UnboundedReceiver<TrackerCommand>,
    commands: mpsc::WeakUnboundedSender<TrackerCommand>,
    gateway: Arc<dyn HealthDataGateway>,
    settings: Arc<SettingsStore>,
    clock: Arc<dyn Clock>,
    refresh_interval: Duration,
    state: TrackerState,
    sequencer: RequestSequencer,
    publisher: watch::Sender<TrackerState>,
    periodic: Option<PeriodicRefresh>,
}

impl TrackerActor {
    async fn run(mut self) {
        log_info!("step tracker started");

        while let Some(command) = self.receiver.recv().await {
            match command {
                TrackerCommand::RequestAuthorization { reply } => {
                    self.request_authorization(reply);
                }
                TrackerCommand::AuthorizationCompleted { result, reply } => {
                    self.authorization_completed(result, reply);
                }
                TrackerCommand::Refresh { kind, reply } => {
                    self.issue_refresh(kind, reply);
                }
                TrackerCommand::DailyCompleted { seq, result, reply } => {
                    let outcome = self.complete(RefreshKind::Daily, seq, result, |state, daily, at| {
                        state.apply_daily(daily, at)
                    });
                    respond(reply, outcome);
                }
                TrackerCommand::WeeklyCompleted { seq, result, reply } => {
                    let outcome = self.complete(RefreshKind::Weekly, seq, result, |state, weekly, at| {
                        state.apply_weekly(weekly, at)
                    });
                    respond(reply, outcome);
                }
                TrackerCommand::StartPeriodicRefresh { reply } => {
                    let started = self.start_periodic_refresh();
                    let _ = reply.send(started);
                }
                TrackerCommand::Shutdown => break,
            }
        }

        if self.periodic.take().is_some() {
            self.state.periodic_refresh_active = false;
            self.publish();
        }

        log_info!("step tracker stopped");
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }

    fn record(&mut self, kind: DiagnosticKind, message: String) {
        log_warn!("{:?}: {}", kind, message);
        self.state.record(kind, message, Utc::now());
        self.publish();
    }

    fn request_authorization(&mut self, reply: AuthorizationReply) {
        if !self.gateway.is_available() {
            self.record(
                DiagnosticKind::PlatformUnavailable,
                GatewayError::Unavailable.to_string(),
            );
            let _ = reply.send(Err(TrackerError::PlatformUnavailable));
            return;
        }

        let Some(sender) = self.commands.upgrade() else {
            return;
        };
        let gateway = self.gateway.clone();

        tokio::spawn(async move {
            let result = gateway
                .request_read_authorization(&[SampleType::StepCount])
                .await;
            let _ = sender.send(TrackerCommand::AuthorizationCompleted { result, reply });
        });
    }

    fn authorization_completed(&mut self, result: Result<bool, GatewayError>, reply: AuthorizationReply) {
        let message = match result {
            Ok(true) => {
                log_info!("step count read access granted");
                self.state.authorization = AuthorizationState::Granted;
                self.publish();

                self.issue_refresh(RefreshKind::Daily, None);
                self.issue_refresh(RefreshKind::Weekly, None);
                self.start_periodic_refresh();

                let _ = reply.send(Ok(AuthorizationState::Granted));
                return;
            }
            Err(GatewayError::Unavailable) => {
                self.record(
                    DiagnosticKind::PlatformUnavailable,
                    GatewayError::Unavailable.to_string(),
                );
                let _ = reply.send(Err(TrackerError::PlatformUnavailable));
                return;
            }
            Ok(false) => "read access to step count was denied".to_string(),
            Err(err) => err.to_string(),
        };

        // Access granted earlier is only lost outside the app.
        if !self.state.authorization.is_granted() {
            self.state.authorization = AuthorizationState::Denied;
        }
        self.record(DiagnosticKind::AuthorizationDenied, message.clone());
        let _ = reply.send(Err(TrackerError::AuthorizationDenied(message)));
    }

    fn issue_refresh(&mut self, kind: RefreshKind, reply: RefreshReply) {
        let Some(sender) = self.commands.upgrade() else {
            return;
        };
        let seq = self.sequencer.issue();
        log_debug!("issuing {} refresh #{}", kind.as_str(), seq);
        let now = self.clock.now();
        let gateway = self.gateway.clone();

        match kind {
            RefreshKind::Daily => {
                let (start, end) = today_interval(&now);
                let date = now.date_naive();
                tokio::spawn(async move {
                    let result = gateway
                        .query_cumulative_sum(SampleType::StepCount, start, end)
                        .await
                        .map(|sum| DailyStepCount {
                            date,
                            start,
                            count: sum.unwrap_or(0),
                        });
                    let _ = sender.send(TrackerCommand::DailyCompleted { seq, result, reply });
                });
            }
            RefreshKind::Weekly => {
                let week = week_range(&now, self.settings.week_start());
                tokio::spawn(async move {
                    let result = gateway
                        .query_daily_sums(SampleType::StepCount, &week.days)
                        .await
                        .map(|sums| WeeklyStepCounts::assemble(&week, &sums));
                    let _ = sender.send(TrackerCommand::WeeklyCompleted { seq, result, reply });
                });
            }
        }
    }

    fn complete<T>(
        &mut self,
        kind: RefreshKind,
        seq: u64,
        result: Result<T, GatewayError>,
        apply: impl FnOnce(&mut TrackerState, T, chrono::DateTime<Utc>),
    ) -> RefreshOutcome {
        match result {
            Ok(value) => {
                if !self.sequencer.accept(kind, seq) {
                    log_debug!("dropping stale {} response #{}", kind.as_str(), seq);
                    return RefreshOutcome::Stale;
                }
                apply(&mut self.state, value, Utc::now());
                self.publish();
                RefreshOutcome::Applied
            }
            Err(_) if self.sequencer.is_stale(kind, seq) => RefreshOutcome::Stale,
            Err(err) => {
                let message = format!("{} step query failed: {err}", kind.as_str());
                self.record(DiagnosticKind::QueryFailure, message.clone());
                RefreshOutcome::Failed(message)
            }
        }
    }

    fn start_periodic_refresh(&mut self) -> bool {
        if self.periodic.as_ref().is_some_and(PeriodicRefresh::is_running) {
            return false;
        }

        self.periodic = Some(PeriodicRefresh::spawn(
            self.commands.clone(),
            self.refresh_interval,
        ));
        self.state.periodic_refresh_active = true;
        self.publish();
        true
    }
}

fn respond(reply: RefreshReply, outcome: RefreshOutcome) {
    if let Some(reply) = reply {
        let _ = reply.send(outcome);
    }
}
