use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use crate::app::App;
use crate::ui::constants::{HOST_PICKER_WIDTH, NOTICE_WIDTH_PERCENT, PROMPT_WIDTH_PERCENT};
use crate::ui::helpers::{
    centered_rect_abs, centered_rect_by_width, draw_popup_frame, list_state, modal_height,
    truncate_text,
};

fn key_hint(parts: &[(&'static str, bool)]) -> Line<'static> {
    Line::from(
        parts
            .iter()
            .map(|(text, bold)| {
                if *bold {
                    Span::styled(*text, Style::default().add_modifier(Modifier::BOLD))
                } else {
                    Span::raw(*text)
                }
            })
            .collect::<Vec<_>>(),
    )
}

fn draw_footer(frame: &mut Frame<'_>, line: Line<'static>, area: ratatui::layout::Rect) {
    let footer = Paragraph::new(line)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, area);
}

pub(crate) fn draw_host_picker(frame: &mut Frame<'_>, app: &App) {
    let picker = &app.host_picker;
    let height = modal_height(picker.hosts.len().max(1), 2);
    let area = centered_rect_abs(HOST_PICKER_WIDTH, height, frame.area());
    let inner = draw_popup_frame(
        frame,
        area,
        "Select SSH Host",
        Style::default().fg(Color::Cyan),
    );
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(inner);

    let width = layout[0].width as usize;
    let items: Vec<ListItem> = picker
        .hosts
        .iter()
        .map(|host| ListItem::new(truncate_text(host, width.saturating_sub(2))))
        .collect();
    let list = List::new(items)
        .highlight_symbol("> ")
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = list_state(picker.selected, picker.hosts.len());
    frame.render_stateful_widget(list, layout[0], &mut state);

    draw_footer(
        frame,
        key_hint(&[
            ("Enter", true),
            (" to connect, ", false),
            ("q", true),
            (" to quit", false),
        ]),
        layout[1],
    );
}

pub(crate) fn draw_prompt(frame: &mut Frame<'_>, question: &str) {
    let height = modal_height(question.lines().count().max(1), 2);
    let area = centered_rect_by_width(PROMPT_WIDTH_PERCENT, height, frame.area());
    let inner = draw_popup_frame(frame, area, "Confirm", Style::default().fg(Color::Yellow));
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(question).wrap(Wrap { trim: true }),
        layout[0],
    );
    draw_footer(
        frame,
        key_hint(&[("y", true), (" yes, any other key no", false)]),
        layout[1],
    );
}

pub(crate) fn draw_notice(frame: &mut Frame<'_>, app: &App) {
    let Some(notice) = &app.notice else {
        return;
    };
    let height = modal_height(notice.message.lines().count().max(1) + 1, 2);
    let area = centered_rect_by_width(NOTICE_WIDTH_PERCENT, height, frame.area());
    let inner = draw_popup_frame(
        frame,
        area,
        notice.title.as_str(),
        Style::default().fg(Color::Yellow),
    );
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(2), Constraint::Length(2)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(notice.message.as_str()).wrap(Wrap { trim: true }),
        layout[0],
    );
    draw_footer(
        frame,
        key_hint(&[("Press ", false), ("Enter", true), (" to close.", false)]),
        layout[1],
    );
}
