//! # tictask
//!
//! A personal time-tracking widget for the terminal. One task accrues time at a time, recurring daily break windows suspend the clock, and total/best times survive restarts.
//!
//! ## Features
//!
//! *   **One clock, one task**: select a task and the clock accrues for it; switching tasks banks the session into the task's lifetime total.
//! *   **Break windows**: recurring daily breaks (including windows that cross midnight, e.g. 19:00 - 00:30) suspend accounting automatically and resume it when they end.
//! *   **Pause that sticks**: a manual pause survives break boundaries — a break ending never restarts a clock you paused yourself.
//! *   **Records**: each completed session competes for the task's best record; totals accumulate forever.
//! *   **Crash-safe accounting**: elapsed time is recomputed from persisted timestamps, so a reload or crash loses at most the moment in flight. Time while the program was closed still counts, minus any breaks it crossed.
//! *   **Dual Interface**:
//!     *   **CLI**: scriptable single commands.
//!     *   **TUI**: live clock, break countdown and roster in one dashboard.
//!
//! ## Installation
//!
//! ```bash
//! cargo install --path .
//! ```
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! Simply run the command without arguments to launch the interactive UI:
//!
//! ```bash
//! tictask
//! # or explicitly
//! tictask ui
//! ```
//!
//! #### TUI Key Bindings
//!
//! *   `q`: Quit (state is saved)
//! *   `j`/`k` or arrows: Move selection highlight
//! *   `Enter`: Start timing the highlighted task
//! *   `Space`: Pause / resume
//! *   `c`: Complete the current task (banks time, competes for the record, moves it to the end)
//! *   `n`: Next task (banks time without completing)
//! *   `a`: Add task
//! *   `r`: Rename highlighted task
//! *   `d`: Delete highlighted task
//! *   `J`/`K`: Move highlighted task down/up in the roster
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! # Tasks
//! tictask add "Write report"
//! tictask list
//! tictask select 2
//! tictask status
//!
//! # The clock
//! tictask pause
//! tictask resume
//! tictask done      # complete current task
//! tictask next      # switch without completing
//!
//! # Breaks
//! tictask break list
//! tictask break add 12:00 13:00 --name Lunch
//! tictask break add 19:00 00:30 --name "Evening rest"   # crosses midnight
//! tictask break remove 1
//! ```
//!
//! ## Data Storage
//!
//! Tasks and settings are saved in your local data directory:
//! *   Linux: `~/.local/share/tictask/`
//! *   macOS: `~/Library/Application Support/tictask/`
//! *   Windows: `%APPDATA%\tictask\`
//!
//! You can override this by setting the `TICTASK_DB` environment variable to
//! the tasks file path; the settings file lives next to it.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use tictask::commands::*;
use tictask::tui::run_tui;

#[derive(Parser)]
#[command(name = "tictask")]
#[command(about = "One-task-at-a-time terminal time tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
    },
    /// List tasks in roster order
    List,
    /// Start timing the task at the given position
    Select {
        /// 1-based roster position
        position: usize,
    },
    /// Show the current task, elapsed time and break state
    Status,
    /// Pause the clock
    Pause,
    /// Resume a paused clock
    Resume,
    /// Complete the current task and move to the next
    Done,
    /// Switch to the next task without completing the current one
    Next,
    /// Remove a task
    Remove {
        /// 1-based roster position
        position: usize,
    },
    /// Rename a task
    Rename {
        /// 1-based roster position
        position: usize,
        /// New task name
        name: String,
    },
    /// Set a task's display color
    Recolor {
        /// 1-based roster position
        position: usize,
        /// Color as #rrggbb
        color: String,
    },
    /// Re-sequence the roster
    Reorder {
        /// Current 1-based positions in their desired new order
        positions: Vec<usize>,
    },
    /// Manage break windows
    Break {
        #[command(subcommand)]
        command: BreakCommands,
    },
    /// Reset the database (delete all tasks, settings and timer state)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Subcommand)]
enum BreakCommands {
    /// Add a break window (start later than end crosses midnight)
    Add {
        /// Start time, HH:MM (24-hour)
        start: String,
        /// End time, HH:MM (24-hour)
        end: String,
        /// Display label
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List break windows
    List,
    /// Remove a break window
    Remove {
        /// 1-based position from `break list`
        position: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Add { name }) => cmd_add(name, false),
        Some(Commands::List) => cmd_list(),
        Some(Commands::Select { position }) => cmd_select(position, false),
        Some(Commands::Status) => cmd_status(),
        Some(Commands::Pause) => cmd_pause(false),
        Some(Commands::Resume) => cmd_resume(false),
        Some(Commands::Done) => cmd_done(false),
        Some(Commands::Next) => cmd_next(false),
        Some(Commands::Remove { position }) => cmd_remove(position, false),
        Some(Commands::Rename { position, name }) => cmd_rename(position, name, false),
        Some(Commands::Recolor { position, color }) => cmd_recolor(position, color, false),
        Some(Commands::Reorder { positions }) => cmd_reorder(positions, false),
        Some(Commands::Break { command }) => match command {
            BreakCommands::Add { start, end, name } => cmd_break_add(start, end, name, false),
            BreakCommands::List => cmd_break_list(),
            BreakCommands::Remove { position } => cmd_break_remove(position, false),
        },
        Some(Commands::Reset { force }) => cmd_reset(force),
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "tictask", &mut io::stdout());
        }
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui() {
                eprintln!("Error running TUI: {}", e);
            }
        }
    }
}
