use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::app::App;
use crate::ui::draw_ui;

const TICK: Duration = Duration::from_millis(100);

pub(crate) trait Interaction {
    /// Yes/no question. Anything but an explicit yes counts as no.
    fn confirm(&mut self, app: &App, question: &str) -> Result<bool>;

    /// Called repeatedly while a transfer runs. Returns true when the user
    /// asked to cancel.
    fn transfer_tick(&mut self, app: &App, label: &str, percent: u8) -> Result<bool>;
}

pub(crate) struct TerminalInteraction<'a> {
    terminal: &'a mut Terminal<CrosstermBackend<io::Stdout>>,
}

impl<'a> TerminalInteraction<'a> {
    pub(crate) fn new(terminal: &'a mut Terminal<CrosstermBackend<io::Stdout>>) -> Self {
        Self { terminal }
    }

    fn draw(&mut self, app: &App, prompt: Option<&str>) -> Result<()> {
        self.terminal
            .draw(|frame| draw_ui(frame, app, prompt))
            .context("draw frame")?;
        Ok(())
    }
}

impl Interaction for TerminalInteraction<'_> {
    fn confirm(&mut self, app: &App, question: &str) -> Result<bool> {
        loop {
            self.draw(app, Some(question))?;
            match event::read().context("read key")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(matches!(key.code, KeyCode::Char('y' | 'Y')));
                }
                _ => {}
            }
        }
    }

    fn transfer_tick(&mut self, app: &App, _label: &str, _percent: u8) -> Result<bool> {
        self.draw(app, None)?;
        if !event::poll(TICK).context("poll input")? {
            return Ok(false);
        }
        let Event::Key(key) = event::read().context("read key")? else {
            return Ok(false);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }
        let ctrl_c =
            key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c'));
        Ok(ctrl_c || matches!(key.code, KeyCode::Char('q' | 'Q') | KeyCode::Esc))
    }
}
