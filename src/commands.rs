//! Entry points the front end calls. Errors cross this boundary as strings.

use std::path::PathBuf;

use crate::calendar::week_range;
use crate::models::AuthorizationState;
use crate::tracker::RefreshOutcome;
use crate::views::{
    GraphTab, GraphView, MainAction, MainView, SettingsAction, SettingsView,
};
use crate::AppState;

pub async fn request_authorization(state: &AppState) -> Result<AuthorizationState, String> {
    state
        .tracker
        .request_authorization()
        .await
        .map_err(|e| e.to_string())
}

pub async fn refresh_steps(state: &AppState) -> Result<(RefreshOutcome, RefreshOutcome), String> {
    state.tracker.refresh_all().await.map_err(|e| e.to_string())
}

pub async fn dispatch_main_action(state: &AppState, action: MainAction) -> Result<(), String> {
    match action {
        MainAction::RequestAuthorization => request_authorization(state).await.map(|_| ()),
        MainAction::Refresh => refresh_steps(state).await.map(|_| ()),
    }
}

pub fn get_main_view(state: &AppState) -> MainView {
    MainView::from_state(&state.tracker.snapshot())
}

pub fn get_graph_view(state: &AppState, tab: GraphTab) -> GraphView {
    let now = state.clock.now();
    let week = week_range(&now, state.settings.week_start());
    GraphView::new(
        &state.tracker.snapshot(),
        state.settings.daily_goal(),
        &week,
        now.date_naive(),
        tab,
    )
}

/// Showing the graph screen re-queries both totals first.
pub async fn open_graph_view(state: &AppState, tab: GraphTab) -> Result<GraphView, String> {
    refresh_steps(state).await?;
    Ok(get_graph_view(state, tab))
}

pub fn get_settings_view(state: &AppState) -> SettingsView {
    SettingsView::new(state.settings.daily_goal())
}

pub fn update_goal(state: &AppState, action: SettingsAction) -> Result<SettingsView, String> {
    let goal = action
        .apply(&state.settings)
        .map_err(|e| e.to_string())?;
    Ok(SettingsView::new(goal))
}

pub async fn import_samples(state: &AppState, path: PathBuf) -> Result<usize, String> {
    let imported = state
        .health
        .import_samples(&path)
        .await
        .map_err(|e| e.to_string())?;
    if imported > 0 {
        refresh_steps(state).await?;
    }
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration, Local};
    use tempfile::TempDir;

    use crate::db::Database;
    use crate::health::{AccessPolicy, LocalHealthStore};
    use crate::models::StepSample;
    use crate::settings::SettingsStore;
    use crate::tracker::{StepTracker, TrackerOptions};
    use crate::calendar::{today_interval, SystemClock};

    fn app(dir: &TempDir, policy: AccessPolicy) -> AppState {
        let db = Database::new(dir.path().join("stepgoal.sqlite3")).unwrap();
        let health = LocalHealthStore::new(db, policy);
        let settings = Arc::new(SettingsStore::new(dir.path().join("settings.json")).unwrap());
        let tracker = StepTracker::spawn(
            Arc::new(health.clone()),
            settings.clone(),
            TrackerOptions::default(),
        );
        AppState {
            tracker,
            settings,
            health,
            clock: Arc::new(SystemClock),
        }
    }

    #[tokio::test]
    async fn import_then_main_view_shows_today() {
        let dir = TempDir::new().unwrap();
        let state = app(&dir, AccessPolicy::Grant);

        assert_eq!(
            request_authorization(&state).await.unwrap(),
            AuthorizationState::Granted
        );

        let (start, _) = today_interval(&Local::now());
        let sample = StepSample::new(start, start + Duration::minutes(1), 2_400);
        let path = dir.path().join("export.json");
        std::fs::write(&path, serde_json::to_string(&vec![sample]).unwrap()).unwrap();

        assert_eq!(import_samples(&state, path).await.unwrap(), 1);

        match get_main_view(&state) {
            MainView::Steps { today, .. } => assert_eq!(today, 2_400),
            other => panic!("unexpected view {other:?}"),
        }
        let graph = get_graph_view(&state, GraphTab::ThisWeek);
        assert_eq!(graph.weekly.panes.len(), 7);

        state.tracker.shutdown().await;
    }

    #[tokio::test]
    async fn denied_access_keeps_call_to_action() {
        let dir = TempDir::new().unwrap();
        let state = app(&dir, AccessPolicy::Deny);

        assert!(dispatch_main_action(&state, MainAction::RequestAuthorization)
            .await
            .is_err());
        let view = get_main_view(&state);
        assert_eq!(view.actions(), &[MainAction::RequestAuthorization]);

        state.tracker.shutdown().await;
    }

    #[tokio::test]
    async fn goal_updates_flow_into_graph_view() {
        let dir = TempDir::new().unwrap();
        let state = app(&dir, AccessPolicy::Grant);

        let view = update_goal(&state, SettingsAction::Set(4_000)).unwrap();
        assert_eq!(view.goal, 4_000);
        assert_eq!(get_settings_view(&state), view);
        assert_eq!(get_graph_view(&state, GraphTab::Today).daily.goal, 4_000);

        state.tracker.shutdown().await;
    }
}
