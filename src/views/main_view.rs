use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::AuthorizationState;
use crate::tracker::TrackerState;

/// User actions available on the main screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MainAction {
    RequestAuthorization,
    Refresh,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum MainView {
    Steps {
        today: u64,
        notice: Option<String>,
    },
    NeedsAccess {
        authorization: AuthorizationState,
        notice: Option<String>,
    },
}

impl MainView {
    pub fn from_state(state: &TrackerState) -> Self {
        let notice = state.last_diagnostic.as_ref().map(|d| d.message.clone());
        if state.authorization.is_granted() {
            MainView::Steps {
                today: state.today_count(),
                notice,
            }
        } else {
            MainView::NeedsAccess {
                authorization: state.authorization,
                notice,
            }
        }
    }

    pub fn actions(&self) -> &'static [MainAction] {
        match self {
            MainView::Steps { .. } => &[MainAction::Refresh],
            MainView::NeedsAccess { .. } => &[MainAction::RequestAuthorization],
        }
    }
}

impl fmt::Display for MainView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let notice = match self {
            MainView::Steps { today, notice } => {
                writeln!(f, "Today's steps")?;
                write!(f, "{today}\n(refresh)")?;
                notice
            }
            MainView::NeedsAccess { notice, .. } => {
                write!(f, "Access to health data is required\n(allow access)")?;
                notice
            }
        };
        if let Some(notice) = notice {
            write!(f, "\n! {notice}")?;
        }
        Ok(())
    }
}
