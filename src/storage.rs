use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;

use crate::models::{Settings, TaskRecord};

/// Returns the path to the tasks database file (`tasks.json`).
///
/// The path is determined in the following order:
/// 1. `TICTASK_DB` environment variable.
/// 2. `~/.local/share/tictask/tasks.json` (on Linux).
/// 3. `./tasks.json` (fallback).
fn db_path() -> PathBuf {
    std::env::var("TICTASK_DB").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("tictask");
        if !p.exists() {
            let _ = fs::create_dir_all(&p);
        }
        p.push("tasks.json");
        p
    })
}

/// Returns the path to the settings file (`settings.json`), located next to
/// the tasks database.
fn settings_path() -> PathBuf {
    let mut p = db_path();
    p.pop();
    p.push("settings.json");
    p
}

/// Loads all task records from the storage file.
///
/// Returns an empty vector if the file does not exist or cannot be read.
/// Records written by older versions are migrated in place: absent fields
/// take their documented defaults, missing or duplicate ids are backfilled,
/// and a zero best record is normalized to unset.
pub fn load_tasks() -> Vec<TaskRecord> {
    let path = db_path();
    if !path.exists() {
        return Vec::new();
    }
    let mut f = match OpenOptions::new().read(true).open(&path) {
        Ok(f) => f,
        Err(_) => return Vec::new(),
    };
    let mut s = String::new();
    if f.read_to_string(&mut s).is_err() {
        return Vec::new();
    }
    let mut tasks: Vec<TaskRecord> = serde_json::from_str(&s).unwrap_or_else(|_| Vec::new());
    normalize_tasks(&mut tasks);
    tasks
}

fn normalize_tasks(tasks: &mut [TaskRecord]) {
    let mut next_id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
    let mut seen = Vec::with_capacity(tasks.len());
    for task in tasks.iter_mut() {
        if task.id == 0 || seen.contains(&task.id) {
            task.id = next_id;
            next_id += 1;
        }
        seen.push(task.id);
        if task.best_record == Some(0) {
            task.best_record = None;
        }
    }
}

/// Saves the given list of task records to the storage file.
///
/// Overwrites the existing file.
pub fn save_tasks(tasks: &[TaskRecord]) -> std::io::Result<()> {
    let path = db_path();
    let s = serde_json::to_string_pretty(tasks).unwrap();
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Loads the settings, falling back to compiled-in defaults if the file is
/// missing or unreadable. Fields absent from an older save take their
/// defaults; a non-positive blink speed is clamped back to the default.
pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    let mut f = match OpenOptions::new().read(true).open(&path) {
        Ok(f) => f,
        Err(_) => return Settings::default(),
    };
    let mut s = String::new();
    if f.read_to_string(&mut s).is_err() {
        return Settings::default();
    }
    let mut settings: Settings = serde_json::from_str(&s).unwrap_or_default();
    if settings.blink_speed == 0 {
        settings.blink_speed = Settings::default().blink_speed;
    }
    settings
}

/// Saves the settings to the storage file.
pub fn save_settings(settings: &Settings) -> std::io::Result<()> {
    let path = settings_path();
    let s = serde_json::to_string_pretty(settings).unwrap();
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Deletes the tasks and settings files.
pub fn delete_database() -> std::io::Result<()> {
    let t_path = db_path();
    if t_path.exists() {
        fs::remove_file(t_path)?;
    }
    let s_path = settings_path();
    if s_path.exists() {
        fs::remove_file(s_path)?;
    }
    Ok(())
}
