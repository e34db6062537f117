use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One tracked task and its lifetime statistics.
///
/// Serialized field names match the on-disk record (`camelCase`); every field
/// except `name` carries a default so records written by older versions load
/// cleanly.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Unique identifier, stable for the task's lifetime. `0` in a loaded
    /// record means "absent" and is backfilled by storage.
    #[serde(default)]
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Cumulative net active time across all sessions ever, in milliseconds.
    #[serde(default)]
    pub total_time: u64,
    /// Fastest completed session in milliseconds. `None` (serialized as
    /// `null`) until the task has been completed at least once.
    #[serde(default)]
    pub best_record: Option<u64>,
    /// Whether the user confirmed the task finished in its current slot.
    #[serde(default)]
    pub completed: bool,
    /// Display color as `#rrggbb`. Opaque to the accounting engine.
    #[serde(default = "default_task_color")]
    pub color: String,
}

impl TaskRecord {
    /// A fresh task with zeroed statistics.
    pub fn new(id: u64, name: String) -> Self {
        TaskRecord {
            id,
            name,
            total_time: 0,
            best_record: None,
            completed: false,
            color: default_task_color(),
        }
    }
}

/// A recurring daily break window. `start`/`end` are `"HH:MM"` clock times
/// with no date component; `start > end` means the window crosses midnight.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BreakWindow {
    pub start: String,
    pub end: String,
    #[serde(default = "default_break_name")]
    pub name: String,
}

impl BreakWindow {
    pub fn new(start: &str, end: &str, name: &str) -> Self {
        BreakWindow {
            start: start.to_string(),
            end: end.to_string(),
            name: name.to_string(),
        }
    }
}

/// Display colors, persisted with the settings.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ColorSettings {
    #[serde(default = "default_section1_bg")]
    pub section1_bg: String,
    #[serde(default = "default_section2_bg")]
    pub section2_bg: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_border_color")]
    pub border_color: String,
    /// Per-task color overrides, keyed by task id.
    #[serde(default)]
    pub task_specific: HashMap<u64, String>,
}

impl Default for ColorSettings {
    fn default() -> Self {
        ColorSettings {
            section1_bg: default_section1_bg(),
            section2_bg: default_section2_bg(),
            text_color: default_text_color(),
            border_color: default_border_color(),
            task_specific: HashMap::new(),
        }
    }
}

/// Persisted settings, including the saved session state that lets elapsed
/// time resume correctly after the process stops and restarts.
///
/// The session fields use sentinel values on disk: `current_task_index` is
/// `-1` for "no task", `last_start_timestamp` is `0` for "not running".
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Blink period for the active task name in milliseconds.
    #[serde(default = "default_blink_speed")]
    pub blink_speed: u64,
    #[serde(default)]
    pub disable_blink: bool,
    #[serde(default = "default_break_times")]
    pub break_times: Vec<BreakWindow>,
    #[serde(default)]
    pub colors: ColorSettings,
    /// Index of the selected task, or `-1`.
    #[serde(default = "default_current_task_index")]
    pub current_task_index: i64,
    /// Epoch milliseconds when live accrual last began, or `0`.
    #[serde(default)]
    pub last_start_timestamp: i64,
    /// Milliseconds banked from prior segments of the current session.
    #[serde(default)]
    pub accumulated_before_last_start: u64,
    /// User-intended pause, independent of break state.
    #[serde(default)]
    pub manually_paused: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            blink_speed: default_blink_speed(),
            disable_blink: false,
            break_times: default_break_times(),
            colors: ColorSettings::default(),
            current_task_index: default_current_task_index(),
            last_start_timestamp: 0,
            accumulated_before_last_start: 0,
            manually_paused: false,
        }
    }
}

fn default_task_color() -> String {
    "#ffffff".to_string()
}

fn default_break_name() -> String {
    "Unnamed Break".to_string()
}

fn default_section1_bg() -> String {
    "#f0f0f0".to_string()
}

fn default_section2_bg() -> String {
    "#e0e0e0".to_string()
}

fn default_text_color() -> String {
    "#333333".to_string()
}

fn default_border_color() -> String {
    "#cccccc".to_string()
}

fn default_blink_speed() -> u64 {
    500
}

fn default_current_task_index() -> i64 {
    -1
}

/// Default break schedule used on first run and by `reset`. The last window
/// crosses midnight on purpose.
pub fn default_break_times() -> Vec<BreakWindow> {
    vec![
        BreakWindow::new("07:30", "08:00", "Morning break"),
        BreakWindow::new("12:00", "13:00", "Lunch"),
        BreakWindow::new("19:00", "00:30", "Evening rest"),
    ]
}
