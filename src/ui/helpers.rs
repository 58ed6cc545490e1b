use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::model::DirectoryEntry;
use crate::ui::constants::{POPUP_MIN_HEIGHT, POPUP_MIN_WIDTH};

pub(crate) fn truncate_text(value: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let count = value.chars().count();
    if count <= max_width {
        return value.to_string();
    }
    if max_width <= 3 {
        return value.chars().take(max_width).collect();
    }
    let mut trimmed: String = value.chars().take(max_width - 3).collect();
    trimmed.push_str("...");
    trimmed
}

pub(crate) fn truncate_path(value: &str, max_width: usize) -> String {
    let count = value.chars().count();
    if count <= max_width {
        return value.to_string();
    }
    if max_width <= 3 {
        return value.chars().skip(count - max_width).collect();
    }
    let tail: String = value.chars().skip(count - (max_width - 3)).collect();
    format!("...{tail}")
}

pub(crate) fn entry_label(entry: &DirectoryEntry, max_width: usize) -> String {
    let mark = if entry.selected { "* " } else { "  " };
    let suffix = if entry.is_dir && !entry.is_parent() { "/" } else { "" };
    let name = format!("{}{suffix}", entry.name);
    let name = truncate_text(&name, max_width.saturating_sub(mark.len()));
    format!("{mark}{name}")
}

pub(crate) fn centered_rect_abs(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.max(POPUP_MIN_WIDTH).min(area.width);
    let height = height.max(POPUP_MIN_HEIGHT).min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height,
    }
}

pub(crate) fn centered_rect_by_width(percent_x: u16, height: u16, area: Rect) -> Rect {
    let scaled = u32::from(area.width) * u32::from(percent_x) / 100;
    let width = u16::try_from(scaled)
        .unwrap_or(u16::MAX)
        .min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    centered_rect_abs(width, height, area)
}

pub(crate) fn padded_rect(area: Rect, pad: u16) -> Rect {
    Rect {
        x: area.x + pad,
        y: area.y + pad,
        width: area.width.saturating_sub(pad * 2),
        height: area.height.saturating_sub(pad * 2),
    }
}

pub(crate) fn modal_height(content_lines: usize, footer_lines: usize) -> u16 {
    let total = content_lines + footer_lines + 2;
    (total as u16).saturating_add(2 + 2)
}

pub(crate) fn draw_popup_frame(frame: &mut Frame<'_>, area: Rect, title: &str, style: Style) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).border_style(style);
    frame.render_widget(block, area);
    let inner = padded_rect(area, 1);
    if inner.height < 2 {
        return inner;
    }
    let title_line = Paragraph::new(title)
        .alignment(Alignment::Center)
        .style(style.add_modifier(Modifier::BOLD));
    frame.render_widget(title_line, Rect { height: 1, ..inner });
    let separator = Paragraph::new("-".repeat(inner.width as usize)).style(style);
    frame.render_widget(
        separator,
        Rect {
            y: inner.y + 1,
            height: 1,
            ..inner
        },
    );
    Rect {
        y: inner.y + 2,
        height: inner.height.saturating_sub(2),
        ..inner
    }
}

pub(crate) fn list_state(selected: usize, len: usize) -> ratatui::widgets::ListState {
    let mut state = ratatui::widgets::ListState::default();
    if len == 0 {
        state.select(None);
    } else {
        state.select(Some(selected.min(len.saturating_sub(1))));
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_text_handles_edges() {
        assert_eq!(truncate_text("abc", 0), "");
        assert_eq!(truncate_text("abc", 2), "ab");
        assert_eq!(truncate_text("abcdef", 4), "a...");
        assert_eq!(truncate_text("short", 10), "short");
    }

    #[test]
    fn truncate_path_keeps_tail() {
        assert_eq!(truncate_path("/home/alice/projects", 12), ".../projects");
        assert_eq!(truncate_path("/tmp", 12), "/tmp");
        assert_eq!(truncate_path("/abcdef", 2), "ef");
    }

    #[test]
    fn entry_label_marks_dirs_and_selection() {
        let mut dir = DirectoryEntry::new("src", true);
        assert_eq!(entry_label(&dir, 20), "  src/");
        dir.selected = true;
        assert_eq!(entry_label(&dir, 20), "* src/");
        assert_eq!(entry_label(&DirectoryEntry::parent(), 20), "  ..");
        assert_eq!(
            entry_label(&DirectoryEntry::new("a-very-long-name.txt", false), 10),
            "  a-ver..."
        );
    }

    #[test]
    fn list_state_clamps_selection() {
        assert!(list_state(5, 0).selected().is_none());
        assert_eq!(list_state(5, 3).selected(), Some(2));
    }

    #[test]
    fn centered_rect_by_width_handles_very_wide_terminals() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 4000,
            height: 50,
        };
        let rect = centered_rect_by_width(60, 9, area);
        assert_eq!(rect.width, 2400);
        assert_eq!(rect.height, 9);
        assert_eq!(rect.x, 800);
    }

    #[test]
    fn centered_rect_abs_clamps_to_area() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 10,
            height: 5,
        };
        let rect = centered_rect_abs(100, 100, area);
        assert_eq!(rect, area);
    }
}
