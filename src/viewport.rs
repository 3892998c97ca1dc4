/// Widths below this many logical pixels use the compact presentation.
pub const COMPACT_BREAKPOINT_PX: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Progressive reveal, single column.
    Compact,
    /// Numbered pages, side-by-side panels.
    Regular,
}

impl ViewMode {
    pub fn classify(width_px: u32) -> Self {
        if width_px < COMPACT_BREAKPOINT_PX {
            ViewMode::Compact
        } else {
            ViewMode::Regular
        }
    }
}

/// Tracks the display width and its presentation mode. No hysteresis: every
/// resize reclassifies immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportClassifier {
    cell_width_px: u32,
    width_px: u32,
    mode: ViewMode,
}

impl ViewportClassifier {
    /// Samples the initial terminal width in columns.
    pub fn new(columns: u16, cell_width_px: u32) -> Self {
        let cell_width_px = cell_width_px.max(1);
        let width_px = u32::from(columns) * cell_width_px;
        Self {
            cell_width_px,
            width_px,
            mode: ViewMode::classify(width_px),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    /// Applies a resize to `columns`; returns true when the mode changed.
    pub fn resize(&mut self, columns: u16) -> bool {
        self.width_px = u32::from(columns) * self.cell_width_px;
        let mode = ViewMode::classify(self.width_px);
        let changed = mode != self.mode;
        if changed {
            tracing::debug!(width_px = self.width_px, ?mode, "viewport reclassified");
        }
        self.mode = mode;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_threshold() {
        assert_eq!(ViewMode::classify(767), ViewMode::Compact);
        assert_eq!(ViewMode::classify(768), ViewMode::Regular);
        assert_eq!(ViewMode::classify(0), ViewMode::Compact);
    }

    #[test]
    fn test_columns_convert_to_pixels() {
        let viewport = ViewportClassifier::new(96, 8);
        assert_eq!(viewport.width_px(), 768);
        assert_eq!(viewport.mode(), ViewMode::Regular);

        let viewport = ViewportClassifier::new(95, 8);
        assert_eq!(viewport.mode(), ViewMode::Compact);
    }

    #[test]
    fn test_resize_reports_crossings_only() {
        let mut viewport = ViewportClassifier::new(120, 8);
        assert!(!viewport.resize(110));
        assert!(viewport.resize(80));
        assert_eq!(viewport.mode(), ViewMode::Compact);
        assert!(!viewport.resize(60));
        assert!(viewport.resize(96));
        assert_eq!(viewport.mode(), ViewMode::Regular);
    }

    #[test]
    fn test_zero_cell_width_is_clamped() {
        let viewport = ViewportClassifier::new(100, 0);
        assert_eq!(viewport.width_px(), 100);
    }
}
