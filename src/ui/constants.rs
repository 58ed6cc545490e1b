use ratatui::layout::Constraint;

use crate::app::HeaderMode;

pub(crate) const HELP_TEXT: &str = "Tab switch | Enter open | Space mark | F5/d download | F6/u upload | p hidden | v logs | q quit";

pub(crate) const HEADER_HEIGHT: u16 = 3;
pub(crate) const LOG_HEADER_HEIGHT: u16 = 8;
pub(crate) const TRANSFER_HEIGHT: u16 = 3;
pub(crate) const STATUS_HEIGHT: u16 = 1;
pub(crate) const PANE_BORDER_ROWS: u16 = 2;

pub(crate) const PANE_COLUMN_PERCENTAGES: [u16; 2] = [50, 50];

pub(crate) const HOST_PICKER_WIDTH: u16 = 50;
pub(crate) const PROMPT_WIDTH_PERCENT: u16 = 60;
pub(crate) const NOTICE_WIDTH_PERCENT: u16 = 50;

pub(crate) const POPUP_MIN_WIDTH: u16 = 10;
pub(crate) const POPUP_MIN_HEIGHT: u16 = 5;

pub(crate) fn pane_columns() -> [Constraint; 2] {
    PANE_COLUMN_PERCENTAGES.map(Constraint::Percentage)
}

pub(crate) fn header_height(mode: HeaderMode) -> u16 {
    match mode {
        HeaderMode::Help => HEADER_HEIGHT,
        HeaderMode::Logs => LOG_HEADER_HEIGHT,
    }
}

pub(crate) fn pane_rows(height: u16, mode: HeaderMode) -> usize {
    height
        .saturating_sub(header_height(mode))
        .saturating_sub(TRANSFER_HEIGHT + STATUS_HEIGHT + PANE_BORDER_ROWS)
        .max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pane_rows_never_drops_to_zero() {
        assert_eq!(pane_rows(24, HeaderMode::Help), 15);
        assert_eq!(pane_rows(24, HeaderMode::Logs), 10);
        assert_eq!(pane_rows(4, HeaderMode::Help), 1);
    }
}
