//! Dialog widgets: the search input line and the selectable results list.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::core::results::ResultEntry;
use crate::ui::theme::Theme;

pub struct QueryBar<'a> {
    pub block: Block<'a>,
    pub query: &'a str,
    pub has_focus: bool,
}

impl Widget for QueryBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = self.block.inner(area);
        self.block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let cursor = if self.has_focus { "▏" } else { "" };
        Paragraph::new(Line::from(vec![
            Span::styled("Search: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(self.query.to_string(), Theme::input_style()),
            Span::raw(cursor),
        ]))
        .render(inner, buf);
    }
}

pub struct ResultsList<'a> {
    pub block: Block<'a>,
    pub entries: &'a [ResultEntry],
    pub cursor: usize,
    pub has_focus: bool,
    /// Shown instead of rows when the list is empty.
    pub empty_hint: &'a str,
}

impl Widget for ResultsList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = self.block.inner(area);
        self.block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.entries.is_empty() {
            Paragraph::new(Line::from(Span::styled(self.empty_hint, Theme::hint_style())))
                .render(Rect::new(inner.x, inner.y, inner.width, 1), buf);
            return;
        }

        let rows = inner.height as usize;
        let offset = scroll_offset(self.cursor, rows);
        for (row, (idx, entry)) in self
            .entries
            .iter()
            .enumerate()
            .skip(offset)
            .take(rows)
            .enumerate()
        {
            let on_cursor = self.has_focus && idx == self.cursor;
            let mark = if entry.selected { "[x] " } else { "[ ] " };
            let mark_style = if entry.selected {
                Theme::checked_style()
            } else {
                Theme::label_style()
            };
            let mut line = Line::from(vec![
                Span::styled(mark, mark_style),
                Span::styled(entry.resource.label.clone(), Theme::label_style()),
                Span::raw("  "),
                Span::styled(entry.resource.uri.clone(), Theme::uri_style()),
            ]);
            if on_cursor {
                line = line.patch_style(Theme::cursor_style());
            }
            Paragraph::new(line).render(
                Rect::new(inner.x, inner.y + row as u16, inner.width, 1),
                buf,
            );
        }
    }
}

/// First visible row so that `cursor` stays on screen.
fn scroll_offset(cursor: usize, rows: usize) -> usize {
    if rows == 0 {
        0
    } else {
        cursor.saturating_sub(rows - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resource::Resource;

    #[test]
    fn offset_keeps_cursor_visible() {
        assert_eq!(scroll_offset(0, 5), 0);
        assert_eq!(scroll_offset(4, 5), 0);
        assert_eq!(scroll_offset(7, 5), 3);
        assert_eq!(scroll_offset(3, 0), 0);
    }

    #[test]
    fn rows_show_checkbox_and_label() {
        let entries = vec![
            ResultEntry {
                resource: Resource::new("REQ-1", "http://x/1"),
                selected: true,
            },
            ResultEntry {
                resource: Resource::new("REQ-2", "http://x/2"),
                selected: false,
            },
        ];
        let area = Rect::new(0, 0, 40, 2);
        let mut buf = Buffer::empty(area);
        ResultsList {
            block: Block::default(),
            entries: &entries,
            cursor: 0,
            has_focus: true,
            empty_hint: "",
        }
        .render(area, &mut buf);

        let line = |y: u16| -> String {
            (0..area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect()
        };
        assert!(line(0).starts_with("[x] REQ-1  http://x/1"));
        assert!(line(1).starts_with("[ ] REQ-2"));
    }
}
