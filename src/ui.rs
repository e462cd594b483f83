use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
};

use crate::domain::{CmdMode, RowedConfig};
use crate::model::{Model, UIData};

pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const CMDLINE_HEIGHT: usize = 1;
pub const HANDLE_WIDTH: usize = 4;
pub const COLUMN_WIDTH_MARGIN: usize = 1;

const DRAG_HANDLE: char = '☰';
const BULK_MARK: char = '▌';
const MODIFIED_MARK: char = '*';

#[derive(Debug)]
pub struct TableUI {}

impl TableUI {
    pub fn new(_config: &RowedConfig) -> Self {
        TableUI {}
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let area = frame.area();

        self.draw_table(uidata, frame, area);
        self.draw_statusline(uidata, frame, area);

        if uidata.show_prefs {
            self.draw_prefs(uidata, frame, area);
        }
        if uidata.show_popup {
            self.draw_popup(uidata, frame, area);
        }
    }

    fn draw_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut lines = Vec::with_capacity(uidata.nrows + 1);
        lines.push(self.header_line(uidata));

        for row in 0..uidata.nrows {
            lines.push(self.row_line(uidata, row));
        }

        let table_area = Rect {
            height: area.height.saturating_sub(CMDLINE_HEIGHT as u16),
            ..area
        };
        frame.render_widget(Paragraph::new(lines), table_area);
    }

    fn header_line(&self, uidata: &UIData) -> Line<'static> {
        let mut spans = vec![Span::raw(" ".repeat(uidata.layout.handle_width))];
        spans.push(Span::styled(
            format!("{} ", pad(&uidata.index.name, uidata.index.width)),
            Style::new().add_modifier(Modifier::DIM),
        ));

        for (col, column) in uidata.table.iter().enumerate() {
            let mut style = Style::new().add_modifier(Modifier::BOLD);
            if col == uidata.selected_column {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            spans.push(Span::styled(
                format!("{} ", pad(&column.name, column.width)),
                style,
            ));
        }
        Line::from(spans)
    }

    fn row_line(&self, uidata: &UIData, row: usize) -> Line<'static> {
        let marked = uidata.marked_rows.get(row).copied().unwrap_or(false);
        let modified = uidata.modified_rows.get(row).copied().unwrap_or(false);

        let mut row_style = Style::new();
        if uidata.drag_source_row == Some(row) {
            row_style = row_style.add_modifier(Modifier::DIM);
        } else if uidata.drag_over_row == Some(row) {
            row_style = row_style
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED);
        } else if row == uidata.selected_row {
            row_style = row_style.add_modifier(Modifier::REVERSED);
        }
        if modified {
            row_style = row_style.fg(Color::Yellow);
        }

        let mark = if marked { BULK_MARK } else { ' ' };
        let flag = if modified { MODIFIED_MARK } else { ' ' };
        let mut spans = vec![Span::styled(
            format!("{flag}{DRAG_HANDLE}{mark} "),
            row_style.add_modifier(Modifier::DIM),
        )];

        let index_value = uidata.index.data.get(row).map(String::as_str).unwrap_or("");
        spans.push(Span::styled(
            format!("{} ", pad(index_value, uidata.index.width)),
            row_style.add_modifier(Modifier::DIM),
        ));

        for (col, column) in uidata.table.iter().enumerate() {
            let value = column.data.get(row).map(String::as_str).unwrap_or("");
            let mut style = row_style;
            if row == uidata.selected_row && col == uidata.selected_column {
                style = style.add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(format!("{} ", pad(value, column.width)), style));
        }
        Line::from(spans)
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let line = if uidata.active_cmdinput {
            self.cmdinput_line(uidata)
        } else {
            self.status_line(uidata)
        };
        let status_area = Rect {
            y: area.height.saturating_sub(CMDLINE_HEIGHT as u16),
            height: CMDLINE_HEIGHT as u16,
            ..area
        };
        frame.render_widget(Paragraph::new(line), status_area);
    }

    fn cmdinput_line(&self, uidata: &UIData) -> Line<'static> {
        let prompt = match uidata.cmd_mode {
            Some(CmdMode::Search) => "/",
            Some(CmdMode::EditCell) => "edit> ",
            Some(CmdMode::BulkEdit) => "bulk> ",
            None => "> ",
        };

        // Render a block curser at the edit position.
        let input = &uidata.cmdinput.input;
        let pos = uidata.cmdinput.curser_pos;
        let before: String = input.chars().take(pos).collect();
        let at: String = input.chars().skip(pos).take(1).collect();
        let after: String = input.chars().skip(pos + 1).collect();
        let curser = if at.is_empty() { " ".to_string() } else { at };

        Line::from(vec![
            Span::styled(prompt.to_string(), Style::new().add_modifier(Modifier::BOLD)),
            Span::raw(before),
            Span::styled(curser, Style::new().add_modifier(Modifier::REVERSED)),
            Span::raw(after),
        ])
    }

    fn status_line(&self, uidata: &UIData) -> Line<'static> {
        let mut right = format!(
            "{} rows | page {}/{} | {}/page",
            uidata.total_matching, uidata.page, uidata.total_pages, uidata.rows_per_page
        );
        if !uidata.search.is_empty() {
            right = format!("/{} | {}", uidata.search, right);
        }
        if uidata.pending_edits {
            right = format!("unsaved edits | {right}");
        }

        let left = if uidata.status_message.is_empty() {
            uidata.name.clone()
        } else {
            uidata.status_message.clone()
        };
        let gap = uidata
            .layout
            .width
            .saturating_sub(left.chars().count() + right.chars().count() + 1);

        Line::from(vec![
            Span::raw(left),
            Span::raw(" ".repeat(gap)),
            Span::styled(right, Style::new().add_modifier(Modifier::DIM)),
        ])
    }

    fn draw_popup(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = uidata
            .popup_message
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect();
        let width = uidata
            .popup_message
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0) as u16
            + 4;
        let height = lines.len() as u16 + 2;

        let popup_area = centered_rect(width, height, area);
        let block = Block::bordered()
            .title(Line::from(" rowed ".bold()).centered())
            .title_bottom(Line::from(" Close <Esc> ".blue().bold()).centered())
            .border_set(border::THICK);

        frame.render_widget(Clear, popup_area);
        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }

    fn draw_prefs(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut lines = Vec::with_capacity(uidata.prefs.len());
        for (idx, (name, visible)) in uidata.prefs.iter().enumerate() {
            let checkbox = if *visible { "[x]" } else { "[ ]" };
            let mut style = Style::new();
            if idx == uidata.prefs_selected {
                style = style.add_modifier(Modifier::REVERSED);
            }
            if idx == 0 {
                // The index column is pinned and cannot be hidden.
                style = style.add_modifier(Modifier::DIM);
            }
            lines.push(Line::from(Span::styled(
                format!(" {checkbox} {name} "),
                style,
            )));
        }

        let width = uidata
            .prefs
            .iter()
            .map(|(name, _)| name.chars().count() + 6)
            .max()
            .unwrap_or(0)
            .max(44) as u16;
        let height = lines.len() as u16 + 2;

        let prefs_area = centered_rect(width, height, area);
        let block = Block::bordered()
            .title(Line::from(" Columns ".bold()).centered())
            .title_bottom(
                Line::from(vec![
                    " Toggle ".into(),
                    "<Space>".blue().bold(),
                    " Move ".into(),
                    "<J/K>".blue().bold(),
                    " Save ".into(),
                    "<Enter>".blue().bold(),
                    " Cancel ".into(),
                    "<Esc> ".blue().bold(),
                ])
                .centered(),
            )
            .border_set(border::THICK);

        frame.render_widget(Clear, prefs_area);
        frame.render_widget(Paragraph::new(lines).block(block), prefs_area);
    }
}

/// Pad or truncate a cell value to the column's render width.
fn pad(value: &str, width: usize) -> String {
    let count = value.chars().count();
    if count > width {
        value.chars().take(width).collect()
    } else {
        format!("{value}{}", " ".repeat(width - count))
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_fills_and_truncates() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("abcdef", 4), "abcd");
        assert_eq!(pad("Zoë", 4), "Zoë ");
    }

    #[test]
    fn centered_rect_is_clamped_to_the_area() {
        let area = Rect::new(0, 0, 80, 24);
        let r = centered_rect(40, 10, area);
        assert_eq!((r.x, r.y, r.width, r.height), (20, 7, 40, 10));

        let r = centered_rect(200, 100, area);
        assert_eq!((r.width, r.height), (80, 24));
    }
}
