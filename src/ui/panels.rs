use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};

use crate::app::{App, HeaderMode};
use crate::model::{DirectoryListing, Focus, Target, TransferPhase};
use crate::ui::constants::HELP_TEXT;
use crate::ui::helpers::{entry_label, truncate_path};

pub(crate) fn draw_header(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title_style = Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD);
    match app.header_mode {
        HeaderMode::Help => {
            let help = Paragraph::new(HELP_TEXT)
                .block(
                    Block::default()
                        .title(Line::from(Span::styled("Help", title_style)))
                        .borders(Borders::ALL),
                )
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(help, area);
        }
        HeaderMode::Logs => {
            let rows = area.height.saturating_sub(2) as usize;
            let mut lines: Vec<Line> = app
                .log_lines
                .iter()
                .rev()
                .take(rows)
                .map(|line| Line::from(line.as_str()))
                .collect();
            lines.reverse();
            if lines.is_empty() {
                lines.push(Line::from(app.last_log.as_str()));
            }
            let logs = Paragraph::new(lines)
                .block(
                    Block::default()
                        .title(Line::from(Span::styled("Logs", title_style)))
                        .borders(Borders::ALL),
                )
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(logs, area);
        }
    }
}

fn pane_title(listing: &DirectoryListing, width: usize) -> String {
    let prefix = match &listing.target {
        Target::Local => "Local: ".to_string(),
        Target::Remote { host } => format!("Remote: {host}:"),
    };
    let room = width.saturating_sub(prefix.chars().count() + 2);
    format!("{prefix}{}", truncate_path(&listing.path, room))
}

pub(crate) fn draw_pane(frame: &mut Frame<'_>, app: &App, side: Focus, area: Rect) {
    let listing = app.pane(side);
    let focused = app.focus == side;
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let rows = area.height.saturating_sub(2) as usize;
    let width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = listing
        .entries
        .iter()
        .enumerate()
        .skip(listing.scroll_offset)
        .take(rows)
        .map(|(idx, entry)| {
            let mut style = if entry.is_dir {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            if entry.selected {
                style = style.add_modifier(Modifier::BOLD);
            }
            if focused && idx == listing.selected {
                style = style.add_modifier(Modifier::REVERSED);
            }
            ListItem::new(Line::from(Span::styled(entry_label(entry, width), style)))
        })
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(pane_title(listing, area.width as usize)),
    );
    frame.render_widget(list, area);
}

pub(crate) fn draw_transfer_line(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Transfer");
    match app.engine.current_label() {
        Some(label) => {
            let percent = app.engine.progress();
            let gauge = Gauge::default()
                .block(block)
                .percent(u16::from(percent))
                .label(format!("{label} {percent}%"))
                .style(Style::default().fg(Color::Gray))
                .gauge_style(Style::default().fg(Color::Green));
            frame.render_widget(gauge, area);
        }
        None => {
            let color = match app.engine.phase() {
                TransferPhase::Failed => Color::Red,
                TransferPhase::Completed => Color::Green,
                _ => Color::Gray,
            };
            let idle = Paragraph::new(app.transfer_line.as_str())
                .block(block)
                .style(Style::default().fg(color));
            frame.render_widget(idle, area);
        }
    }
}

pub(crate) fn draw_status_line(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(app.status.as_str(), Style::default().fg(Color::White)),
    ]));
    frame.render_widget(status, area);
}
