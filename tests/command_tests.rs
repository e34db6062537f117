use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use tictask::commands::*;
use tictask::models::Settings;
use tictask::storage::{load_settings, load_tasks, save_settings};

// Use a mutex to ensure tests run serially since they modify the environment variable
static TEST_MUTEX: Mutex<()> = Mutex::new(());

fn with_test_db<F>(test_name: &str, f: F)
where
    F: FnOnce(PathBuf),
{
    let _guard = TEST_MUTEX.lock().unwrap();

    let mut dir = env::temp_dir();
    dir.push(format!("tictask_test_{}", test_name));
    let _ = fs::create_dir_all(&dir);
    let mut db_path = dir.clone();
    db_path.push("tasks.json");

    // Set env var
    env::set_var("TICTASK_DB", db_path.to_str().unwrap());

    // Clean up before test
    let mut settings_path = dir.clone();
    settings_path.push("settings.json");
    for p in [&db_path, &settings_path] {
        if p.exists() {
            fs::remove_file(p).unwrap();
        }
    }

    // Run test
    f(db_path.clone());

    // Clean up after test
    for p in [&db_path, &settings_path] {
        if p.exists() {
            fs::remove_file(p).unwrap();
        }
    }
    let _ = fs::remove_dir(&dir);
    env::remove_var("TICTASK_DB");
}

/// Persist a settings file with no break windows, so assertions about the
/// running state cannot depend on the wall-clock time the tests run at.
fn clear_breaks() {
    let mut settings = Settings::default();
    settings.break_times.clear();
    save_settings(&settings).unwrap();
}

#[test]
fn test_add_selects_first_task() {
    with_test_db("add", |_path| {
        clear_breaks();
        cmd_add("Write report".into(), true);

        let tasks = load_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Write report");
        assert_eq!(tasks[0].total_time, 0);
        assert_eq!(tasks[0].best_record, None);
        assert!(!tasks[0].completed);

        // The first task starts timing immediately.
        let settings = load_settings();
        assert_eq!(settings.current_task_index, 0);
        assert!(!settings.manually_paused);
        assert_ne!(settings.last_start_timestamp, 0);
    });
}

#[test]
fn test_add_rejects_empty_name() {
    with_test_db("add_empty", |_path| {
        cmd_add("   ".into(), true);
        assert!(load_tasks().is_empty());
    });
}

#[test]
fn test_select_switches_current_task() {
    with_test_db("select", |_path| {
        cmd_add("A".into(), true);
        cmd_add("B".into(), true);

        cmd_select(2, true);
        let settings = load_settings();
        assert_eq!(settings.current_task_index, 1);

        // Out-of-range positions are refused without side effects.
        cmd_select(5, true);
        assert_eq!(load_settings().current_task_index, 1);
    });
}

#[test]
fn test_pause_and_resume_round_trip() {
    with_test_db("pause_resume", |_path| {
        clear_breaks();
        cmd_add("A".into(), true);

        cmd_pause(true);
        let settings = load_settings();
        assert!(settings.manually_paused);
        assert_eq!(settings.last_start_timestamp, 0);

        cmd_resume(true);
        let settings = load_settings();
        assert!(!settings.manually_paused);
        assert_ne!(settings.last_start_timestamp, 0);
    });
}

#[test]
fn test_done_completes_and_rotates() {
    with_test_db("done", |_path| {
        cmd_add("A".into(), true);
        cmd_add("B".into(), true);

        cmd_done(true);

        let tasks = load_tasks();
        // A moved to the end, completed; B took its slot and is current.
        assert_eq!(tasks[0].name, "B");
        assert_eq!(tasks[1].name, "A");
        assert!(tasks[1].completed);
        assert!(!tasks[0].completed);
        assert_eq!(load_settings().current_task_index, 0);
    });
}

#[test]
fn test_next_defers_without_completing() {
    with_test_db("next", |_path| {
        cmd_add("A".into(), true);
        cmd_add("B".into(), true);

        cmd_next(true);

        let tasks = load_tasks();
        assert_eq!(tasks[0].name, "A");
        assert!(!tasks[0].completed);
        assert_eq!(load_settings().current_task_index, 1);
    });
}

#[test]
fn test_remove_current_drops_selection() {
    with_test_db("remove", |_path| {
        cmd_add("A".into(), true);
        cmd_add("B".into(), true);

        cmd_remove(1, true);

        let tasks = load_tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "B");
        assert_eq!(load_settings().current_task_index, -1);
    });
}

#[test]
fn test_rename_and_reorder() {
    with_test_db("rename_reorder", |_path| {
        cmd_add("A".into(), true);
        cmd_add("B".into(), true);
        cmd_add("C".into(), true);

        cmd_rename(2, "Bee".into(), true);
        assert_eq!(load_tasks()[1].name, "Bee");

        // Current is A (position 1); reverse the order.
        cmd_reorder(vec![3, 2, 1], true);
        let tasks = load_tasks();
        assert_eq!(tasks[0].name, "C");
        assert_eq!(tasks[2].name, "A");
        // The selection followed A to its new position.
        assert_eq!(load_settings().current_task_index, 2);
    });
}

#[test]
fn test_break_add_validates_times() {
    with_test_db("break_add", |_path| {
        let before = load_settings().break_times.len();

        cmd_break_add("23:00".into(), "01:00".into(), Some("Night".into()), true);
        let settings = load_settings();
        assert_eq!(settings.break_times.len(), before + 1);
        let added = settings.break_times.last().unwrap();
        assert_eq!(added.name, "Night");
        assert_eq!(added.start, "23:00");

        // Malformed times are rejected at edit time.
        cmd_break_add("25:00".into(), "26:00".into(), None, true);
        assert_eq!(load_settings().break_times.len(), before + 1);
    });
}

#[test]
fn test_break_remove() {
    with_test_db("break_remove", |_path| {
        let before = load_settings().break_times.len();
        assert!(before > 0, "default schedule seeds break windows");

        cmd_break_remove(1, true);
        assert_eq!(load_settings().break_times.len(), before - 1);

        // Out-of-range positions are refused.
        cmd_break_remove(99, true);
        assert_eq!(load_settings().break_times.len(), before - 1);
    });
}

#[test]
fn test_reset_clears_everything() {
    with_test_db("reset", |_path| {
        cmd_add("A".into(), true);
        assert_eq!(load_tasks().len(), 1);

        cmd_reset(true);

        assert!(load_tasks().is_empty());
        let settings = load_settings();
        assert_eq!(settings.current_task_index, -1);
        assert_eq!(settings.break_times, tictask::models::default_break_times());
    });
}

#[test]
fn test_recolor_sets_override() {
    with_test_db("recolor", |_path| {
        cmd_add("A".into(), true);
        let id = load_tasks()[0].id;

        cmd_recolor(1, "#ff0000".into(), true);

        let tasks = load_tasks();
        assert_eq!(tasks[0].color, "#ff0000");
        let settings = load_settings();
        assert_eq!(
            settings.colors.task_specific.get(&id),
            Some(&"#ff0000".to_string())
        );
    });
}
