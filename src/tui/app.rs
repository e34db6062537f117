use chrono::{DateTime, Local};
use ratatui::widgets::TableState;

use crate::commands::Tracker;
use crate::format::format_elapsed;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub enum InputField {
    None,
    AddName,
    RenameName,
}

/// TUI state: the live engine plus view/input bookkeeping. The engine is
/// ticked once per draw loop and saved on every user event, on break
/// boundaries, and on exit.
pub struct App {
    pub tracker: Tracker,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    /// One-line user-visible notice (invalid operation, save failure).
    pub notice: Option<String>,
    was_on_break: bool,
}

impl App {
    /// Loads persisted state and positions the highlight on the current
    /// task.
    pub fn new() -> App {
        let now = Local::now();
        let tracker = Tracker::load(now);
        let mut state = TableState::default();
        if !tracker.roster.is_empty() {
            state.select(Some(tracker.clock.current_index().unwrap_or(0)));
        }
        let was_on_break = tracker.clock.on_break().is_some();
        App {
            tracker,
            state,
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            notice: None,
            was_on_break,
        }
    }

    /// Advances the engine one observation. Break boundary crossings are
    /// persisted immediately so a crash mid-break cannot resurrect suspended
    /// time.
    pub fn tick(&mut self, now: DateTime<Local>) {
        self.tracker.clock.tick(&self.tracker.schedule, now);
        let on_break = self.tracker.clock.on_break().is_some();
        if on_break != self.was_on_break {
            self.was_on_break = on_break;
            self.save();
        }
    }

    /// Selects the next row in the roster table.
    pub fn next(&mut self) {
        if self.tracker.roster.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= self.tracker.roster.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row in the roster table.
    pub fn previous(&mut self) {
        if self.tracker.roster.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.tracker.roster.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Starts timing the highlighted task.
    pub fn select_highlighted(&mut self, now: DateTime<Local>) {
        if let Some(i) = self.state.selected() {
            if i < self.tracker.roster.len() {
                self.tracker
                    .clock
                    .select_task(&mut self.tracker.roster, Some(i), now);
                self.save();
            }
        }
    }

    /// Space bar: pause when running, resume when paused.
    pub fn toggle_pause(&mut self, now: DateTime<Local>) {
        let clock = &mut self.tracker.clock;
        if clock.current_index().is_none() {
            self.notice = Some("No task selected.".to_string());
            return;
        }
        if clock.is_paused() {
            if !clock.resume(now) {
                if let Some(b) = clock.on_break() {
                    self.notice = Some(format!(
                        "On \"{}\" — the clock resumes when the break ends.",
                        b.name
                    ));
                }
                return;
            }
        } else {
            clock.pause(now);
        }
        self.save();
    }

    /// Completes the current task and starts the one taking its slot.
    pub fn complete_current(&mut self, now: DateTime<Local>) {
        let Some(session) = self
            .tracker
            .clock
            .complete_current(&mut self.tracker.roster, now)
        else {
            self.notice = Some("No task selected.".to_string());
            return;
        };
        self.notice = Some(format!("Completed in {}.", format_elapsed(session)));
        self.follow_current();
        self.save();
    }

    /// Banks the session and advances without completing.
    pub fn defer_current(&mut self, now: DateTime<Local>) {
        if self
            .tracker
            .clock
            .defer_current(&mut self.tracker.roster, now)
            .is_none()
        {
            self.notice = Some("No tasks to switch.".to_string());
            return;
        }
        self.follow_current();
        self.save();
    }

    /// Deletes the highlighted task. Deleting the selected task drops the
    /// selection.
    pub fn delete_highlighted(&mut self, _now: DateTime<Local>) {
        let Some(i) = self.state.selected() else { return };
        let Some(id) = self.tracker.roster.get(i).map(|t| t.id) else {
            return;
        };
        if let Some(removed) = self.tracker.roster.remove(id) {
            self.tracker.clock.task_removed(removed);
            self.tracker.settings.colors.task_specific.remove(&id);
        }
        if self.tracker.roster.is_empty() {
            self.state.select(None);
        } else if i >= self.tracker.roster.len() {
            self.state.select(Some(self.tracker.roster.len() - 1));
        }
        self.save();
    }

    /// Moves the highlighted task one slot down the roster.
    pub fn move_down(&mut self) {
        if let Some(i) = self.state.selected() {
            if i + 1 < self.tracker.roster.len() {
                self.swap(i, i + 1);
                self.state.select(Some(i + 1));
            }
        }
    }

    /// Moves the highlighted task one slot up the roster.
    pub fn move_up(&mut self) {
        if let Some(i) = self.state.selected() {
            if i > 0 {
                self.swap(i, i - 1);
                self.state.select(Some(i - 1));
            }
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        let current_id = self
            .tracker
            .clock
            .current_index()
            .and_then(|i| self.tracker.roster.get(i))
            .map(|t| t.id);
        self.tracker.roster.swap(a, b);
        let new_index = current_id.and_then(|id| self.tracker.roster.position_of(id));
        self.tracker.clock.relocate_current(new_index);
        self.save();
    }

    /// Opens the add-task prompt.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Editing;
        self.input_field = InputField::AddName;
        self.input_buffer.clear();
    }

    /// Opens the rename prompt for the highlighted task.
    pub fn start_rename(&mut self) {
        let Some(i) = self.state.selected() else { return };
        let Some(task) = self.tracker.roster.get(i) else {
            return;
        };
        self.input_buffer = task.name.clone();
        self.input_mode = InputMode::Editing;
        self.input_field = InputField::RenameName;
    }

    /// Commits the pending prompt.
    pub fn handle_input(&mut self, now: DateTime<Local>) {
        match self.input_field {
            InputField::AddName => {
                let name = self.input_buffer.trim().to_string();
                if name.is_empty() {
                    self.notice = Some("Task name cannot be empty.".to_string());
                } else {
                    self.tracker.roster.add(name);
                    if self.tracker.clock.current_index().is_none() {
                        let last = self.tracker.roster.len() - 1;
                        self.tracker
                            .clock
                            .select_task(&mut self.tracker.roster, Some(last), now);
                    }
                    if self.state.selected().is_none() {
                        self.state.select(Some(0));
                    }
                    self.save();
                }
            }
            InputField::RenameName => {
                let id = self
                    .state
                    .selected()
                    .and_then(|i| self.tracker.roster.get(i))
                    .map(|t| t.id);
                if let Some(id) = id {
                    if !self.tracker.roster.rename(id, &self.input_buffer) {
                        self.notice = Some("Task name cannot be empty.".to_string());
                    } else {
                        self.save();
                    }
                }
            }
            InputField::None => {}
        }
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
    }

    /// Moves the highlight to the engine's current task after a task switch.
    fn follow_current(&mut self) {
        if let Some(i) = self.tracker.clock.current_index() {
            self.state.select(Some(i));
        }
    }

    /// Persists everything; a failure becomes a notice, never an exit.
    pub fn save(&mut self) {
        if let Err(e) = self.tracker.save() {
            self.notice = Some(format!("Failed to save: {}", e));
        }
    }
}
