//! Line-oriented front end. One task reads commands from stdin, another
//! re-renders the current screen whenever the tracker, the goal or the
//! screen selection changes.

use std::{path::PathBuf, str::FromStr, sync::Arc};

use anyhow::{anyhow, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::commands;
use crate::views::{GraphTab, MainAction, SettingsAction};
use crate::AppState;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const HELP: &str = "commands: main | graph | week | day <1-7> | settings | auth | refresh | \
                    goal <n> | + | - | import <path> | help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Main,
    Graph { tab: GraphTab, day: Option<usize> },
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ConsoleCommand {
    Show(Screen),
    Main(MainAction),
    Goal(SettingsAction),
    Import(PathBuf),
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let head = parts.next().unwrap_or_default();
        let arg = parts.next();

        let command = match (head, arg) {
            ("main", None) => ConsoleCommand::Show(Screen::Main),
            ("graph", None) => ConsoleCommand::Show(Screen::Graph {
                tab: GraphTab::Today,
                day: None,
            }),
            ("week", None) => ConsoleCommand::Show(Screen::Graph {
                tab: GraphTab::ThisWeek,
                day: None,
            }),
            ("day", Some(raw)) => {
                let day: usize = raw.parse().map_err(|_| anyhow!("day must be 1-7"))?;
                if !(1..=7).contains(&day) {
                    return Err(anyhow!("day must be 1-7"));
                }
                ConsoleCommand::Show(Screen::Graph {
                    tab: GraphTab::ThisWeek,
                    day: Some(day - 1),
                })
            }
            ("settings", None) => ConsoleCommand::Show(Screen::Settings),
            ("auth", None) => ConsoleCommand::Main(MainAction::RequestAuthorization),
            ("refresh", None) => ConsoleCommand::Main(MainAction::Refresh),
            ("goal", Some(raw)) => {
                let value: i64 = raw.parse().map_err(|_| anyhow!("goal must be a number"))?;
                ConsoleCommand::Goal(SettingsAction::Set(value))
            }
            ("+", None) => ConsoleCommand::Goal(SettingsAction::Increment),
            ("-", None) => ConsoleCommand::Goal(SettingsAction::Decrement),
            ("import", Some(path)) => ConsoleCommand::Import(PathBuf::from(path)),
            ("help", None) => ConsoleCommand::Help,
            ("quit" | "exit", None) => ConsoleCommand::Quit,
            _ => return Err(anyhow!("unknown command '{}'", line.trim())),
        };

        if parts.next().is_some() {
            return Err(anyhow!("too many arguments"));
        }
        Ok(command)
    }
}

fn render(state: &AppState, screen: Screen) -> String {
    match screen {
        Screen::Main => commands::get_main_view(state).to_string(),
        Screen::Graph { tab, day } => {
            let mut view = commands::get_graph_view(state, tab);
            if let Some(day) = day {
                view.weekly.select(day);
            }
            view.to_string()
        }
        Screen::Settings => commands::get_settings_view(state).to_string(),
    }
}

async fn render_loop(state: Arc<AppState>, mut screen_rx: watch::Receiver<Screen>) {
    let mut tracker_rx = state.tracker.subscribe();
    let mut goal_rx = state.settings.subscribe_goal();

    loop {
        let screen = *screen_rx.borrow_and_update();
        tracker_rx.borrow_and_update();
        goal_rx.borrow_and_update();
        println!("\n{}", render(&state, screen));

        tokio::select! {
            changed = screen_rx.changed() => if changed.is_err() { break },
            changed = tracker_rx.changed() => if changed.is_err() { break },
            changed = goal_rx.changed() => if changed.is_err() { break },
        }
    }
}

pub async fn run(state: Arc<AppState>) -> Result<()> {
    let (screen_tx, screen_rx) = watch::channel(Screen::Main);
    let renderer = tokio::spawn(render_loop(state.clone(), screen_rx));

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<ConsoleCommand>() {
            Ok(command) => command,
            Err(err) => {
                println!("{err}\n{HELP}");
                continue;
            }
        };

        let result = match command {
            ConsoleCommand::Show(screen) => {
                if let Screen::Graph { tab, .. } = screen {
                    // Opening the graph re-queries; the renderer picks the result up.
                    if let Err(err) = commands::open_graph_view(&state, tab).await {
                        log_warn!("graph refresh failed: {err}");
                    }
                }
                screen_tx.send_replace(screen);
                Ok(())
            }
            ConsoleCommand::Main(action) => {
                screen_tx.send_replace(Screen::Main);
                commands::dispatch_main_action(&state, action).await
            }
            ConsoleCommand::Goal(action) => {
                screen_tx.send_replace(Screen::Settings);
                commands::update_goal(&state, action).map(|_| ())
            }
            ConsoleCommand::Import(path) => commands::import_samples(&state, path)
                .await
                .map(|count| println!("imported {count} samples")),
            ConsoleCommand::Help => {
                println!("{HELP}");
                Ok(())
            }
            ConsoleCommand::Quit => break,
        };

        if let Err(err) = result {
            println!("! {err}");
        }
    }

    log_info!("console closed");
    renderer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_and_actions() {
        assert_eq!("main".parse::<ConsoleCommand>().unwrap(), ConsoleCommand::Show(Screen::Main));
        assert_eq!(
            "day 3".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Show(Screen::Graph {
                tab: GraphTab::ThisWeek,
                day: Some(2)
            })
        );
        assert_eq!(
            "goal 12000".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Goal(SettingsAction::Set(12_000))
        );
        assert_eq!(
            "+".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Goal(SettingsAction::Increment)
        );
        assert_eq!(
            "auth".parse::<ConsoleCommand>().unwrap(),
            ConsoleCommand::Main(MainAction::RequestAuthorization)
        );
        assert_eq!("exit".parse::<ConsoleCommand>().unwrap(), ConsoleCommand::Quit);
    }

    #[test]
    fn rejects_bad_input() {
        assert!("day 8".parse::<ConsoleCommand>().is_err());
        assert!("goal lots".parse::<ConsoleCommand>().is_err());
        assert!("refresh now".parse::<ConsoleCommand>().is_err());
        assert!("dance".parse::<ConsoleCommand>().is_err());
    }
}
