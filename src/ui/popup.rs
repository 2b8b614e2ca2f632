//! Create-form popup overlay.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::app::state::CreateFormState;
use crate::ui::layout::centered_fixed;
use crate::ui::theme::Theme;

pub struct CreateFormPopup<'a> {
    pub form: &'a CreateFormState,
    pub creator_url: &'a str,
}

impl Widget for CreateFormPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (self.form.fields.len() as u16) + 6;
        let popup = centered_fixed(64, height, area);
        Clear.render(popup, buf);

        let block = Block::default()
            .title(" Create resource ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(popup);
        block.render(popup, buf);

        let mut lines = vec![Line::from(Span::styled(
            format!(" POST {}", self.creator_url),
            Theme::hint_style(),
        ))];
        lines.push(Line::raw(""));

        let name_width = self
            .form
            .fields
            .iter()
            .filter_map(|f| f.name.as_deref())
            .map(|n| n.chars().count())
            .max()
            .unwrap_or(0);

        for (i, field) in self.form.fields.iter().enumerate() {
            let selected = i == self.form.selected;
            let prefix = if selected { " ▸ " } else { "   " };
            let name = field.name.as_deref().unwrap_or("");
            let label_style = if selected {
                Style::default()
                    .fg(Color::White)
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{prefix}{name:<name_width$} "), label_style),
                Span::styled(field.value.clone(), Theme::input_style()),
            ]));
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  ↑/↓: field  Enter: create  Esc: back",
            Theme::hint_style(),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}
