pub mod clock;
pub mod commands;
pub mod format;
pub mod models;
pub mod roster;
pub mod schedule;
pub mod storage;
pub mod tui;
