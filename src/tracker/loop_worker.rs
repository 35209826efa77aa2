use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::controller::TrackerCommand;
use super::state::RefreshKind;

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Handle to the running refresh loop. Dropping it cancels the loop.
pub(crate) struct PeriodicRefresh {
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl PeriodicRefresh {
    pub fn spawn(commands: WeakUnboundedSender<TrackerCommand>, period: Duration) -> Self {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(refresh_loop(commands, period, cancel_token.clone()));
        Self {
            cancel_token,
            handle,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancel_token.is_cancelled() && !self.handle.is_finished()
    }
}

impl Drop for PeriodicRefresh {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

/// Posts a daily and a weekly refresh every `period`, starting one period
/// from now. Holds only a weak sender so it never keeps the tracker alive.
async fn refresh_loop(
    commands: WeakUnboundedSender<TrackerCommand>,
    period: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log_info!("periodic refresh started ({}s)", period.as_secs());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(sender) = commands.upgrade() else {
                    break;
                };
                let sent = [RefreshKind::Daily, RefreshKind::Weekly]
                    .into_iter()
                    .all(|kind| sender.send(TrackerCommand::Refresh { kind, reply: None }).is_ok());
                if !sent {
                    break;
                }
            }
            _ = cancel_token.cancelled() => {
                break;
            }
        }
    }

    log_info!("periodic refresh stopped");
}
