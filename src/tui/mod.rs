pub mod app;
pub mod ui;

use std::{error::Error, io, time::Duration};

use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use app::{App, InputMode};
use ui::ui;

pub fn run_tui() -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new();

    // Run loop
    let res = run_app(&mut terminal, &mut app);

    // Save on the way out, whatever happened in the loop
    app.save();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

/// The single cooperative timeline: every loop iteration ticks the engine at
/// the current wall time, redraws, then waits up to the poll timeout for a
/// key. Elapsed time is always recomputed from absolute timestamps, so a
/// delayed or backgrounded loop never drifts the clock.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.tick(Local::now());
        terminal.draw(|f| ui(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            let now = Local::now();
            match app.input_mode {
                InputMode::Normal => {
                    app.notice = None;
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Down | KeyCode::Char('j') => app.next(),
                        KeyCode::Up | KeyCode::Char('k') => app.previous(),
                        KeyCode::Enter => app.select_highlighted(now),
                        KeyCode::Char(' ') => app.toggle_pause(now),
                        KeyCode::Char('c') => app.complete_current(now),
                        KeyCode::Char('n') => app.defer_current(now),
                        KeyCode::Char('a') => app.start_add(),
                        KeyCode::Char('r') => app.start_rename(),
                        KeyCode::Char('d') | KeyCode::Delete => app.delete_highlighted(now),
                        KeyCode::Char('J') => app.move_down(),
                        KeyCode::Char('K') => app.move_up(),
                        _ => {}
                    }
                }
                InputMode::Editing => match key.code {
                    KeyCode::Enter => app.handle_input(now),
                    KeyCode::Esc => {
                        app.input_mode = InputMode::Normal;
                        app.input_buffer.clear();
                    }
                    KeyCode::Char(c) => {
                        app.input_buffer.push(c);
                    }
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                    }
                    _ => {}
                },
            }
        }
    }
}
