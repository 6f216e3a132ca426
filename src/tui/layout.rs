use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Split-pane layout configuration
pub struct AppLayout {
    pub tabs_area: Rect,
    pub results_area: Rect,
    pub preview_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Create split-pane layout:
    /// - History tabs + search query: top row
    /// - Results list: 55% width (left)
    /// - Preview pane: 45% width (right)
    /// - Status bar: bottom row
    pub fn new(area: Rect) -> Self {
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Tabs
                Constraint::Min(3),    // Main area (at least 3 rows)
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        let horizontal_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(vertical_chunks[1]);

        Self {
            tabs_area: vertical_chunks[0],
            results_area: horizontal_chunks[0],
            preview_area: horizontal_chunks[1],
            status_area: vertical_chunks[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_splits_correctly() {
        let area = Rect::new(0, 0, 100, 30);
        let layout = AppLayout::new(area);

        assert_eq!(layout.tabs_area.height, 1);
        assert_eq!(layout.tabs_area.y, 0);

        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.status_area.y, 29);

        assert_eq!(layout.results_area.height, 28);
        assert_eq!(layout.preview_area.height, 28);

        assert_eq!(layout.results_area.width, 55);
        assert_eq!(layout.preview_area.width, 45);
    }

    #[test]
    fn test_layout_minimum_height() {
        let area = Rect::new(0, 0, 100, 5);
        let layout = AppLayout::new(area);

        assert_eq!(layout.tabs_area.height, 1);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.results_area.height, 3);
    }
}
