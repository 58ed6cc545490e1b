use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;
use crate::model::{Focus, Mode};
use crate::ui::constants::{STATUS_HEIGHT, TRANSFER_HEIGHT, header_height, pane_columns};
use crate::ui::modals::{draw_host_picker, draw_notice, draw_prompt};
use crate::ui::panels::{draw_header, draw_pane, draw_status_line, draw_transfer_line};

pub(crate) mod constants;
mod helpers;
mod modals;
mod panels;

pub(crate) fn draw_ui(frame: &mut Frame<'_>, app: &App, prompt: Option<&str>) {
    if app.mode == Mode::HostPicker {
        draw_host_picker(frame, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height(app.header_mode)),
                Constraint::Min(3),
                Constraint::Length(TRANSFER_HEIGHT),
                Constraint::Length(STATUS_HEIGHT),
            ])
            .split(frame.area());
        draw_header(frame, app, layout[0]);
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(pane_columns())
            .split(layout[1]);
        draw_pane(frame, app, Focus::Local, panes[0]);
        draw_pane(frame, app, Focus::Remote, panes[1]);
        draw_transfer_line(frame, app, layout[2]);
        draw_status_line(frame, app, layout[3]);
    }

    if app.notice.is_some() {
        draw_notice(frame, app);
    }
    if let Some(question) = prompt {
        draw_prompt(frame, question);
    }
}
