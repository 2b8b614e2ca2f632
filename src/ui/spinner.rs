//! Loading / ready indicator rendered on the results border.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::session::{Indicators, SessionState};
use crate::ui::theme::Theme;

/// Braille-dot spinner frames, one per tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Shows `loading`, `ready` or `failed` in the top-right of `area`.  Renders
/// nothing while neither indicator is visible.
pub struct StatusIndicator<'a> {
    pub indicators: Indicators,
    pub state: &'a SessionState,
    pub tick: u64,
}

impl StatusIndicator<'_> {
    fn label(&self) -> Option<(String, ratatui::style::Style)> {
        if self.indicators.loading {
            let frame = SPINNER_FRAMES[(self.tick as usize) % SPINNER_FRAMES.len()];
            Some((format!(" {frame} loading "), Theme::loading_style()))
        } else if matches!(self.state, SessionState::Failed { .. }) {
            Some((" ✗ failed ".to_string(), Theme::error_style()))
        } else if self.indicators.ready {
            Some((" ready ".to_string(), Theme::ready_style()))
        } else {
            None
        }
    }
}

impl Widget for StatusIndicator<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 16 || area.height == 0 {
            return;
        }
        let Some((label, style)) = self.label() else {
            return;
        };

        let label_width = label.chars().count() as u16;
        // Inside the border: leave one column for the corner.
        let x = area.x + area.width.saturating_sub(label_width + 2);
        buf.set_line(x, area.y, &Line::from(Span::styled(label, style)), label_width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(indicator: StatusIndicator<'_>) -> String {
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        indicator.render(area, &mut buf);
        (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect::<String>()
    }

    #[test]
    fn loading_wins_over_ready() {
        let text = row(StatusIndicator {
            indicators: Indicators { loading: true, ready: true },
            state: &SessionState::Searching,
            tick: 0,
        });
        assert!(text.contains("loading"));
    }

    #[test]
    fn hidden_indicators_render_nothing() {
        let text = row(StatusIndicator {
            indicators: Indicators::default(),
            state: &SessionState::Idle,
            tick: 3,
        });
        assert_eq!(text.trim(), "");
    }

    #[test]
    fn failure_is_shown() {
        let text = row(StatusIndicator {
            indicators: Indicators::default(),
            state: &SessionState::Failed { reason: "x".into() },
            tick: 0,
        });
        assert!(text.contains("failed"));
    }
}
