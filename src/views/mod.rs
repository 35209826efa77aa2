//! Headless screens. Each view is rebuilt from a tracker snapshot and the
//! current goal; none of them hold tracker state.

pub mod chart;
pub mod graph;
pub mod main_view;
pub mod settings_view;
pub mod weekly;

pub use chart::{fill_fraction, DailyChart};
pub use graph::{GraphTab, GraphView};
pub use main_view::{MainAction, MainView};
pub use settings_view::{SettingsAction, SettingsView};
pub use weekly::{WeeklyChart, WeeklyPane};
