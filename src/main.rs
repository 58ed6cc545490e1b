use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

mod app;
mod errors;
mod model;
mod paths;
mod provider;
mod ssh;
mod ssh_config;
mod storage;
mod transfer;
mod ui;

use app::{App, TerminalInteraction};
use ui::constants::pane_rows;

const TICK_RATE: Duration = Duration::from_millis(33);

fn main() -> Result<()> {
    let host = std::env::args().nth(1);
    let mut app = App::load(host)?;

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let result = run_app(&mut terminal, &mut app);

    app.engine.cancel();
    app.save_state();

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let (_, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        app.set_visible_rows(pane_rows(rows, app.header_mode));

        terminal.draw(|frame| ui::draw_ui(frame, app, None))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, KeyCode::Char('c'));
                if ctrl_c {
                    return Ok(());
                }
                if app.handle_key(key, &mut TerminalInteraction::new(terminal))? {
                    return Ok(());
                }
            }
        }

        app.poll_transfer();
    }
}
