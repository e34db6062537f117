use std::io::{self, Write};

use chrono::{DateTime, Local};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::clock::{ClockState, SessionClock};
use crate::format::{format_best, format_elapsed};
use crate::models::{BreakWindow, Settings};
use crate::roster::TaskRoster;
use crate::schedule::{parse_clock, BreakSchedule};
use crate::storage::{delete_database, load_settings, load_tasks, save_settings, save_tasks};

/// The assembled engine: roster, break schedule, session clock and settings,
/// loaded together and saved together. Every CLI command loads one, performs
/// a single operation at the current wall time, and saves; the TUI keeps one
/// alive and ticks it.
pub struct Tracker {
    pub roster: TaskRoster,
    pub clock: SessionClock,
    pub schedule: BreakSchedule,
    pub settings: Settings,
}

impl Tracker {
    /// Loads persisted state, reconstructs the saved session verbatim, then
    /// settles the span the process was down for (offline time counts toward
    /// the task, minus break overlap). A non-empty roster with no valid
    /// selection auto-selects the first task with a fresh running session.
    pub fn load(now: DateTime<Local>) -> Self {
        let roster = TaskRoster::new(load_tasks());
        let settings = load_settings();
        let schedule = BreakSchedule::from_windows(&settings.break_times);
        let clock = SessionClock::from_settings(&settings, roster.len());
        let mut tracker = Tracker {
            roster,
            clock,
            schedule,
            settings,
        };
        tracker.clock.reconcile(&tracker.schedule, now);
        if tracker.clock.current_index().is_none() && !tracker.roster.is_empty() {
            tracker.clock.select_task(&mut tracker.roster, Some(0), now);
        }
        tracker
    }

    /// Writes tasks and settings (including the session fields) back to
    /// storage.
    pub fn save(&mut self) -> io::Result<()> {
        self.clock.store(&mut self.settings);
        save_tasks(self.roster.tasks())?;
        save_settings(&self.settings)
    }

    /// Re-parses the schedule after a break-window edit and re-evaluates the
    /// break state immediately.
    pub fn rebuild_schedule(&mut self, now: DateTime<Local>) {
        self.schedule = BreakSchedule::from_windows(&self.settings.break_times);
        self.clock.tick(&self.schedule, now);
    }

    fn current_task_name(&self) -> Option<&str> {
        self.clock
            .current_index()
            .and_then(|i| self.roster.get(i))
            .map(|t| t.name.as_str())
    }
}

/// Adds a new task. The first task added to an empty roster is selected
/// automatically and starts timing.
pub fn cmd_add(name: String, silent: bool) {
    let name = name.trim().to_string();
    if name.is_empty() {
        if !silent {
            eprintln!("Task name cannot be empty.");
        }
        return;
    }
    let now = Local::now();
    let mut tracker = Tracker::load(now);
    tracker.roster.add(name.clone());
    if tracker.clock.current_index().is_none() {
        let last_index = tracker.roster.len() - 1;
        tracker
            .clock
            .select_task(&mut tracker.roster, Some(last_index), now);
    }
    if let Err(e) = tracker.save() {
        if !silent {
            eprintln!("Failed to save tasks: {}", e);
        }
    } else if !silent {
        println!("Task added: \"{}\" (#{})", name, tracker.roster.len());
    }
}

/// Lists tasks in a formatted table, in roster order, marking the selected
/// one.
pub fn cmd_list() {
    let now = Local::now();
    let tracker = Tracker::load(now);
    if tracker.roster.is_empty() {
        println!("No tasks yet. Add one with `tictask add <name>`.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Total").add_attribute(Attribute::Bold),
            Cell::new("Best").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    let current = tracker.clock.current_index();
    for (i, task) in tracker.roster.iter().enumerate() {
        let is_current = current == Some(i);
        let name = if is_current {
            format!("> {}", task.name)
        } else {
            task.name.clone()
        };
        let total = if is_current {
            // the live session is not folded yet; show it on top of the total
            task.total_time + tracker.clock.compute_elapsed(now)
        } else {
            task.total_time
        };
        let status = if task.completed {
            "Done"
        } else if is_current {
            match tracker.clock.state() {
                ClockState::OnBreak => "On break",
                ClockState::Paused => "Paused",
                _ => "Timing",
            }
        } else {
            "Pending"
        };
        let status_color = if task.completed {
            Color::Green
        } else if is_current {
            Color::Yellow
        } else {
            Color::Reset
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(name).fg(if is_current { Color::Cyan } else { Color::Reset }),
            Cell::new(format_elapsed(total)),
            Cell::new(format_best(task.best_record)),
            Cell::new(status).fg(status_color),
        ]);
    }

    println!("{table}");
}

/// Selects the task at the given 1-based position, folding the previous
/// task's session into its total first.
pub fn cmd_select(position: usize, silent: bool) {
    let now = Local::now();
    let mut tracker = Tracker::load(now);
    if position == 0 || position > tracker.roster.len() {
        if !silent {
            eprintln!(
                "No task at position {} (roster has {}).",
                position,
                tracker.roster.len()
            );
        }
        return;
    }
    tracker
        .clock
        .select_task(&mut tracker.roster, Some(position - 1), now);
    let name = tracker.current_task_name().unwrap_or("").to_string();
    if let Err(e) = tracker.save() {
        if !silent {
            eprintln!("Failed to save state: {}", e);
        }
    } else if !silent {
        println!("Now timing \"{}\".", name);
    }
}

/// Prints the current task, its elapsed session time, records and state.
pub fn cmd_status() {
    let now = Local::now();
    let tracker = Tracker::load(now);
    let task = match tracker.clock.current_index().and_then(|i| tracker.roster.get(i)) {
        Some(task) => task,
        None => {
            println!("No task selected.  Elapsed: {}", format_elapsed(0));
            if let Some(b) = tracker.clock.on_break() {
                println!(
                    "On break \"{}\" ({} left).",
                    b.name,
                    format_elapsed(b.remaining_ms(now))
                );
            }
            return;
        }
    };
    println!("Task:    {}", task.name);
    println!("Elapsed: {}", format_elapsed(tracker.clock.compute_elapsed(now)));
    println!("Best:    {}", format_best(task.best_record));
    println!("Total:   {}", format_elapsed(task.total_time));
    if let Some(b) = tracker.clock.on_break() {
        println!(
            "State:   on break \"{}\" ({} left, {:.0}%)",
            b.name,
            format_elapsed(b.remaining_ms(now)),
            b.fraction_remaining(now) * 100.0
        );
        if tracker.clock.is_paused() {
            println!("         (manually paused; will stay paused after the break)");
        }
    } else if tracker.clock.is_paused() {
        println!("State:   paused");
    } else {
        println!("State:   timing");
    }
}

/// Pauses the current task's clock.
pub fn cmd_pause(silent: bool) {
    let now = Local::now();
    let mut tracker = Tracker::load(now);
    if !tracker.clock.pause(now) {
        if !silent {
            if tracker.clock.current_index().is_none() {
                eprintln!("No task selected, nothing to pause.");
            } else {
                eprintln!("Already paused.");
            }
        }
        return;
    }
    let elapsed = tracker.clock.compute_elapsed(now);
    if let Err(e) = tracker.save() {
        if !silent {
            eprintln!("Failed to save state: {}", e);
        }
    } else if !silent {
        println!("Paused at {}.", format_elapsed(elapsed));
    }
}

/// Resumes a manually paused clock. Refused during a break; the clock
/// resumes on its own when the break ends.
pub fn cmd_resume(silent: bool) {
    let now = Local::now();
    let mut tracker = Tracker::load(now);
    if !tracker.clock.resume(now) {
        if !silent {
            if tracker.clock.current_index().is_none() {
                eprintln!("No task selected, cannot resume.");
            } else if let Some(b) = tracker.clock.on_break() {
                eprintln!(
                    "Cannot resume during \"{}\"; the clock restarts when the break ends.",
                    b.name
                );
            } else {
                eprintln!("Not paused.");
            }
        }
        return;
    }
    let elapsed = tracker.clock.compute_elapsed(now);
    if let Err(e) = tracker.save() {
        if !silent {
            eprintln!("Failed to save state: {}", e);
        }
    } else if !silent {
        println!("Resumed from {}.", format_elapsed(elapsed));
    }
}

/// Marks the current task completed: folds the session, updates the best
/// record when improved, moves the task to the end and starts the task now
/// occupying its old slot.
pub fn cmd_done(silent: bool) {
    let now = Local::now();
    let mut tracker = Tracker::load(now);
    let Some(index) = tracker.clock.current_index() else {
        if !silent {
            eprintln!("No task selected.");
        }
        return;
    };
    let name = tracker.roster.get(index).map(|t| t.name.clone()).unwrap_or_default();
    let old_best = tracker.roster.get(index).and_then(|t| t.best_record);
    let Some(session) = tracker.clock.complete_current(&mut tracker.roster, now) else {
        return;
    };
    let improved = session > 0 && old_best.map_or(true, |b| session < b);
    if let Err(e) = tracker.save() {
        if !silent {
            eprintln!("Failed to save state: {}", e);
        }
        return;
    }
    if !silent {
        if improved {
            println!(
                "Completed \"{}\" in {} — new best record!",
                name,
                format_elapsed(session)
            );
        } else {
            println!("Completed \"{}\" in {}.", name, format_elapsed(session));
        }
        if let Some(next) = tracker.current_task_name() {
            println!("Now timing \"{}\".", next);
        }
    }
}

/// Banks the session into the current task's total without completing it and
/// advances to the next task in roster order.
pub fn cmd_next(silent: bool) {
    let now = Local::now();
    let mut tracker = Tracker::load(now);
    let Some(session) = tracker.clock.defer_current(&mut tracker.roster, now) else {
        if !silent {
            eprintln!("No tasks to switch. Add a task first.");
        }
        return;
    };
    if let Err(e) = tracker.save() {
        if !silent {
            eprintln!("Failed to save state: {}", e);
        }
        return;
    }
    if !silent {
        println!("Banked {}.", format_elapsed(session));
        if let Some(next) = tracker.current_task_name() {
            println!("Now timing \"{}\".", next);
        }
    }
}

/// Removes the task at the given 1-based position. Removing the selected
/// task drops the selection; its unfinished session is discarded with it.
pub fn cmd_remove(position: usize, silent: bool) {
    let now = Local::now();
    let mut tracker = Tracker::load(now);
    if position == 0 || position > tracker.roster.len() {
        if !silent {
            eprintln!("No task at position {}.", position);
        }
        return;
    }
    let Some((id, name)) = tracker.roster.get(position - 1).map(|t| (t.id, t.name.clone()))
    else {
        return;
    };
    if let Some(removed) = tracker.roster.remove(id) {
        tracker.clock.task_removed(removed);
        tracker.settings.colors.task_specific.remove(&id);
    }
    if let Err(e) = tracker.save() {
        if !silent {
            eprintln!("Failed to save state: {}", e);
        }
    } else if !silent {
        println!("Task \"{}\" removed.", name);
        if tracker.clock.current_index().is_none() && !tracker.roster.is_empty() {
            println!("No task selected now; pick one with `tictask select <n>`.");
        }
    }
}

/// Renames the task at the given 1-based position.
pub fn cmd_rename(position: usize, name: String, silent: bool) {
    let now = Local::now();
    let mut tracker = Tracker::load(now);
    let Some(id) = tracker.roster.get(position.wrapping_sub(1)).map(|t| t.id) else {
        if !silent {
            eprintln!("No task at position {}.", position);
        }
        return;
    };
    if !tracker.roster.rename(id, &name) {
        if !silent {
            eprintln!("Task name cannot be empty.");
        }
        return;
    }
    if let Err(e) = tracker.save() {
        if !silent {
            eprintln!("Failed to save tasks: {}", e);
        }
    } else if !silent {
        println!("Task {} renamed.", position);
    }
}

/// Sets the display color of the task at the given 1-based position. The
/// color is opaque to the engine; the TUI understands `#rrggbb`.
pub fn cmd_recolor(position: usize, color: String, silent: bool) {
    let now = Local::now();
    let mut tracker = Tracker::load(now);
    let Some(id) = tracker.roster.get(position.wrapping_sub(1)).map(|t| t.id) else {
        if !silent {
            eprintln!("No task at position {}.", position);
        }
        return;
    };
    tracker.roster.recolor(id, &color);
    tracker.settings.colors.task_specific.insert(id, color);
    if let Err(e) = tracker.save() {
        if !silent {
            eprintln!("Failed to save tasks: {}", e);
        }
    } else if !silent {
        println!("Task {} recolored.", position);
    }
}

/// Re-sequences the roster. `positions` lists current 1-based positions in
/// their desired new order; unlisted tasks keep their relative order after
/// the listed ones. The selection follows the task it pointed at.
pub fn cmd_reorder(positions: Vec<usize>, silent: bool) {
    let now = Local::now();
    let mut tracker = Tracker::load(now);
    let current_id = tracker
        .clock
        .current_index()
        .and_then(|i| tracker.roster.get(i))
        .map(|t| t.id);
    let mut ids = Vec::with_capacity(positions.len());
    for &pos in &positions {
        match tracker.roster.get(pos.wrapping_sub(1)) {
            Some(task) => ids.push(task.id),
            None => {
                if !silent {
                    eprintln!("No task at position {}.", pos);
                }
                return;
            }
        }
    }
    tracker.roster.reorder(&ids);
    let new_index = current_id.and_then(|id| tracker.roster.position_of(id));
    tracker.clock.relocate_current(new_index);
    if let Err(e) = tracker.save() {
        if !silent {
            eprintln!("Failed to save tasks: {}", e);
        }
    } else if !silent {
        println!("Task order saved.");
    }
}

/// Lists the configured break windows.
pub fn cmd_break_list() {
    let tracker = Tracker::load(Local::now());
    if tracker.settings.break_times.is_empty() {
        println!("No break windows configured.");
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Name", "Start", "End"]);
    for (i, bt) in tracker.settings.break_times.iter().enumerate() {
        let valid = parse_clock(&bt.start).is_some() && parse_clock(&bt.end).is_some();
        let name = if valid {
            bt.name.clone()
        } else {
            format!("{} (invalid, ignored)", bt.name)
        };
        table.add_row(vec![
            (i + 1).to_string(),
            name,
            bt.start.clone(),
            bt.end.clone(),
        ]);
    }
    println!("{table}");
}

/// Adds a break window. Times must be `HH:MM`; a start later than the end
/// makes the window cross midnight.
pub fn cmd_break_add(start: String, end: String, name: Option<String>, silent: bool) {
    if parse_clock(&start).is_none() || parse_clock(&end).is_none() {
        if !silent {
            eprintln!("Break times must be HH:MM (24-hour), e.g. 12:00.");
        }
        return;
    }
    let now = Local::now();
    let mut tracker = Tracker::load(now);
    let name = name.unwrap_or_else(|| "New Break".to_string());
    tracker
        .settings
        .break_times
        .push(BreakWindow::new(&start, &end, &name));
    tracker.rebuild_schedule(now);
    if let Err(e) = tracker.save() {
        if !silent {
            eprintln!("Failed to save settings: {}", e);
        }
    } else if !silent {
        println!("Break \"{}\" added ({} - {}).", name, start, end);
    }
}

/// Removes the break window at the given 1-based position.
pub fn cmd_break_remove(position: usize, silent: bool) {
    let now = Local::now();
    let mut tracker = Tracker::load(now);
    if position == 0 || position > tracker.settings.break_times.len() {
        if !silent {
            eprintln!("No break window at position {}.", position);
        }
        return;
    }
    let removed = tracker.settings.break_times.remove(position - 1);
    tracker.rebuild_schedule(now);
    if let Err(e) = tracker.save() {
        if !silent {
            eprintln!("Failed to save settings: {}", e);
        }
    } else if !silent {
        println!("Break \"{}\" removed.", removed.name);
    }
}

/// Resets the database: deletes all tasks, settings and timer state.
pub fn cmd_reset(force: bool) {
    if !force {
        print!("Are you sure you want to reset ALL data (tasks, settings, and timers)? This cannot be undone. [y/N] ");
        io::stdout().flush().unwrap();
        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return;
        }
    }

    if let Err(e) = delete_database() {
        eprintln!("Failed to reset database: {}", e);
    } else {
        println!("All data reset to defaults.");
    }
}
