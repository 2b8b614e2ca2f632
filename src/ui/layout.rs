//! Layout helpers — split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Query line on top, results in the middle, status bar at the bottom.
pub struct AppLayout {
    pub query_area: Rect,
    pub results_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_area(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // bordered query input
                Constraint::Min(3),    // results list
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            query_area: chunks[0],
            results_area: chunks[1],
            status_area: chunks[2],
        }
    }
}

/// A centered rectangle with fixed dimensions, clamped to `area`.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
