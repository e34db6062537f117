use chrono::{DateTime, Local, TimeZone};

use crate::models::Settings;
use crate::roster::TaskRoster;
use crate::schedule::{BreakInstance, BreakSchedule};

/// Display state of the clock. `OnBreak` wins over `Paused` for display
/// purposes (the break label is shown either way); the accounting precedence
/// is the opposite — a manual pause survives break boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Running,
    Paused,
    OnBreak,
}

/// The accounting core: converts real-time observations (tick, pause,
/// resume, select, complete, defer) into an authoritative elapsed-time value
/// for the active task.
///
/// Central invariant: elapsed time is `accumulated_ms` plus, only while live
/// (`last_start` set), `now - last_start`. Exactly one of banked /
/// live-accruing holds at any instant; every transition below folds or
/// restarts the live span to preserve that.
///
/// Break windows suspend accrual (the exclude-from-live-span policy): the
/// live span is folded up to the window boundary on entry and a new span
/// starts on exit, unless the user has manually paused — manual pause always
/// dominates, so a break ending never auto-resumes a paused task.
#[derive(Debug, Clone)]
pub struct SessionClock {
    current: Option<usize>,
    accumulated_ms: u64,
    last_start: Option<DateTime<Local>>,
    manually_paused: bool,
    on_break: Option<BreakInstance>,
}

impl SessionClock {
    /// An idle clock with no task selected.
    pub fn idle() -> Self {
        SessionClock {
            current: None,
            accumulated_ms: 0,
            last_start: None,
            manually_paused: true,
            on_break: None,
        }
    }

    /// Reconstructs the saved clock from persisted settings, verbatim, so
    /// `compute_elapsed` round-trips across a save/load. Call
    /// [`reconcile`](Self::reconcile) once afterwards to settle the span the
    /// process was down for.
    pub fn from_settings(settings: &Settings, roster_len: usize) -> Self {
        let current = usize::try_from(settings.current_task_index)
            .ok()
            .filter(|&i| i < roster_len);
        if current.is_none() {
            return SessionClock::idle();
        }
        let manually_paused = settings.manually_paused;
        let last_start = if manually_paused || settings.last_start_timestamp == 0 {
            None
        } else {
            Local
                .timestamp_millis_opt(settings.last_start_timestamp)
                .single()
        };
        SessionClock {
            current,
            accumulated_ms: settings.accumulated_before_last_start,
            last_start,
            manually_paused,
            on_break: None,
        }
    }

    /// Writes the session fields back into the persisted settings.
    pub fn store(&self, settings: &mut Settings) {
        settings.current_task_index = self.current.map(|i| i as i64).unwrap_or(-1);
        settings.last_start_timestamp = self
            .last_start
            .map(|t| t.timestamp_millis())
            .unwrap_or(0);
        settings.accumulated_before_last_start = self.accumulated_ms;
        settings.manually_paused = self.manually_paused;
    }

    /// Settles the span between the persisted `last_start` and `now`: time
    /// the process was down counts toward the task, minus whatever break
    /// instances it crossed. Accrual then restarts at `now`, or stays
    /// suspended if `now` falls inside a break (or the task was paused).
    pub fn reconcile(&mut self, schedule: &BreakSchedule, now: DateTime<Local>) {
        if let Some(start) = self.last_start.take() {
            let span = ms_between(start, now).saturating_sub(schedule.total_overlap(start, now));
            self.accumulated_ms = self.accumulated_ms.saturating_add(span);
        }
        self.on_break = schedule.query(now);
        if self.current.is_some() && !self.manually_paused && self.on_break.is_none() {
            self.last_start = Some(now);
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn is_paused(&self) -> bool {
        self.manually_paused
    }

    pub fn on_break(&self) -> Option<&BreakInstance> {
        self.on_break.as_ref()
    }

    pub fn state(&self) -> ClockState {
        if self.on_break.is_some() {
            ClockState::OnBreak
        } else if self.current.is_none() {
            ClockState::Idle
        } else if self.manually_paused {
            ClockState::Paused
        } else {
            ClockState::Running
        }
    }

    /// Elapsed time of the current session in milliseconds.
    pub fn compute_elapsed(&self, now: DateTime<Local>) -> u64 {
        match self.last_start {
            Some(start) if self.is_live() => {
                self.accumulated_ms.saturating_add(ms_between(start, now))
            }
            _ => self.accumulated_ms,
        }
    }

    fn is_live(&self) -> bool {
        self.current.is_some() && !self.manually_paused && self.on_break.is_none()
    }

    /// Periodic observation of the wall clock. Detects break entry/exit and
    /// settles the live span against the schedule: accrual stops at the
    /// window boundary, not at the tick that noticed it, and a span that
    /// slept across an entire window still has that window deducted.
    pub fn tick(&mut self, schedule: &BreakSchedule, now: DateTime<Local>) {
        let hit = schedule.query(now);
        if let Some(start) = self.last_start {
            let overlap = schedule.total_overlap(start, now);
            if overlap > 0 || hit.is_some() {
                let span = ms_between(start, now).saturating_sub(overlap);
                self.accumulated_ms = self.accumulated_ms.saturating_add(span);
                self.last_start = if hit.is_some() { None } else { Some(now) };
            }
        } else if hit.is_none() && self.on_break.is_some() {
            // Break just ended; a manual pause keeps the clock frozen.
            if self.current.is_some() && !self.manually_paused {
                self.last_start = Some(now);
            }
        }
        self.on_break = hit;
    }

    /// Selects `index` (validated against the roster) as the current task.
    /// The previous task's session is folded into its total exactly once;
    /// the new session starts fresh at zero, running — or suspended when
    /// `now` is inside a break.
    pub fn select_task(
        &mut self,
        roster: &mut TaskRoster,
        index: Option<usize>,
        now: DateTime<Local>,
    ) {
        self.fold_into_total(roster, now);
        self.current = index.filter(|&i| i < roster.len());
        self.accumulated_ms = 0;
        match self.current {
            Some(_) => {
                self.manually_paused = false;
                self.last_start = if self.on_break.is_some() {
                    None
                } else {
                    Some(now)
                };
            }
            None => {
                self.manually_paused = true;
                self.last_start = None;
            }
        }
    }

    /// Freezes the live span into the banked value. No-op when there is no
    /// task or the clock is already paused.
    pub fn pause(&mut self, now: DateTime<Local>) -> bool {
        if self.current.is_none() || self.manually_paused {
            return false;
        }
        if let Some(start) = self.last_start.take() {
            self.accumulated_ms = self.accumulated_ms.saturating_add(ms_between(start, now));
        }
        self.manually_paused = true;
        true
    }

    /// Restarts live accrual from the banked value. Refused while a break is
    /// active: the break's own exit edge is what resumes the clock.
    pub fn resume(&mut self, now: DateTime<Local>) -> bool {
        if !self.manually_paused || self.current.is_none() || self.on_break.is_some() {
            return false;
        }
        self.last_start = Some(now);
        self.manually_paused = false;
        true
    }

    /// Folds the session into the task's total, updates its best record when
    /// strictly improved, marks it completed, moves it to the end of the
    /// roster and selects the task now occupying the vacated index. Returns
    /// the folded session length, or `None` when no task is selected.
    pub fn complete_current(
        &mut self,
        roster: &mut TaskRoster,
        now: DateTime<Local>,
    ) -> Option<u64> {
        let idx = self.current?;
        let session = self.compute_elapsed(now);
        if let Some(task) = roster.get_mut(idx) {
            task.total_time = task.total_time.saturating_add(session);
            if session > 0 && task.best_record.map_or(true, |best| session < best) {
                task.best_record = Some(session);
            }
            task.completed = true;
        }
        self.clear_session();
        roster.move_to_end(idx);
        let next = if roster.is_empty() {
            None
        } else if idx < roster.len() {
            Some(idx)
        } else {
            Some(0)
        };
        self.select_task(roster, next, now);
        Some(session)
    }

    /// Folds the session into the task's total without completing it, then
    /// advances to the next task in roster order. Returns the folded session
    /// length, or `None` when no task is selected.
    pub fn defer_current(&mut self, roster: &mut TaskRoster, now: DateTime<Local>) -> Option<u64> {
        let idx = self.current?;
        let session = self.compute_elapsed(now);
        if let Some(task) = roster.get_mut(idx) {
            task.total_time = task.total_time.saturating_add(session);
        }
        self.clear_session();
        let next = (idx + 1) % roster.len();
        self.select_task(roster, Some(next), now);
        Some(session)
    }

    /// Index fixup after a task was removed from the roster. Removing the
    /// current task drops the selection (its unfinished session goes with
    /// it); removing an earlier task shifts the pointer down by one.
    pub fn task_removed(&mut self, removed: usize) {
        match self.current {
            Some(i) if i == removed => {
                self.clear_session();
                self.manually_paused = true;
            }
            Some(i) if i > removed => self.current = Some(i - 1),
            _ => {}
        }
    }

    /// Index fixup after a reorder. Pure pointer move, no accounting effect.
    pub fn relocate_current(&mut self, new_index: Option<usize>) {
        self.current = new_index;
        if self.current.is_none() {
            self.clear_session();
            self.manually_paused = true;
        }
    }

    fn fold_into_total(&mut self, roster: &mut TaskRoster, now: DateTime<Local>) {
        if let Some(idx) = self.current {
            let session = self.compute_elapsed(now);
            if let Some(task) = roster.get_mut(idx) {
                task.total_time = task.total_time.saturating_add(session);
            }
        }
        self.clear_session();
    }

    fn clear_session(&mut self) {
        self.current = None;
        self.accumulated_ms = 0;
        self.last_start = None;
        self.manually_paused = false;
    }
}

fn ms_between(from: DateTime<Local>, to: DateTime<Local>) -> u64 {
    (to - from).num_milliseconds().max(0) as u64
}
