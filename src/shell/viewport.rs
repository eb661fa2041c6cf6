//! # Render/Follow Controller
//!
//! Vertical scroll state for the pane.
//!
//! - `follow = true`: every frame snaps to the bottom.
//! - `follow = false`: the previous offset is kept across content updates.
//! - New output anchors the view at the first new line (the start of the
//!   region that ends with the input line) instead of snapping to the
//!   bottom, so someone reading scrollback is not yanked away while fresh
//!   output is still surfaced.
//!
//! Anchors are resolved lazily in [`Viewport::sync`], because the final
//! line count is only known when the frame is composed.

/// Scroll position over a list of content lines.
#[derive(Debug, Clone)]
pub struct Viewport {
    height: u16,
    y_offset: usize,
    total_lines: usize,
    follow: bool,
    anchor: Option<usize>,
    wheel_delta: usize,
}

impl Viewport {
    pub fn new(height: u16, wheel_delta: usize) -> Self {
        Self {
            height,
            y_offset: 0,
            total_lines: 0,
            follow: true,
            anchor: None,
            wheel_delta: wheel_delta.max(1),
        }
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn set_height(&mut self, height: u16) {
        self.height = height;
        self.set_y_offset(self.y_offset);
    }

    pub fn y_offset(&self) -> usize {
        self.y_offset
    }

    pub fn follow(&self) -> bool {
        self.follow
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn max_y_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height as usize)
    }

    pub fn at_bottom(&self) -> bool {
        self.y_offset >= self.max_y_offset()
    }

    pub fn set_y_offset(&mut self, y: usize) {
        self.y_offset = y.min(self.max_y_offset());
    }

    pub fn goto_bottom(&mut self) {
        self.y_offset = self.max_y_offset();
    }

    /// Stop following and show `line` at the top on the next sync.
    pub fn anchor_to(&mut self, line: usize) {
        self.follow = false;
        self.anchor = Some(line);
    }

    /// Recompute the offset for content of `total_lines` lines.
    pub fn sync(&mut self, total_lines: usize) {
        self.total_lines = total_lines;
        if self.follow {
            self.anchor = None;
            self.goto_bottom();
        } else if let Some(line) = self.anchor.take() {
            self.set_y_offset(line);
        } else {
            self.set_y_offset(self.y_offset);
        }
    }

    /// Mouse wheel. Scrolling up leaves follow mode; landing on the bottom
    /// re-enters it.
    pub fn wheel(&mut self, up: bool, total_lines: usize) {
        self.total_lines = total_lines;
        self.anchor = None;
        self.follow = false;
        if up {
            self.y_offset = self.y_offset.saturating_sub(self.wheel_delta);
        } else {
            self.set_y_offset(self.y_offset + self.wheel_delta);
        }
        if self.at_bottom() {
            self.follow = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_snaps_to_bottom() {
        let mut vp = Viewport::new(10, 3);
        vp.sync(25);
        assert_eq!(vp.y_offset(), 15);
        vp.sync(40);
        assert_eq!(vp.y_offset(), 30);
        assert!(vp.at_bottom());
    }

    #[test]
    fn test_wheel_up_stops_following_and_keeps_offset() {
        let mut vp = Viewport::new(10, 3);
        vp.sync(25);
        vp.wheel(true, 25);
        assert!(!vp.follow());
        assert_eq!(vp.y_offset(), 12);

        vp.sync(30);
        assert_eq!(vp.y_offset(), 12);
    }

    #[test]
    fn test_wheel_back_to_bottom_resumes_following() {
        let mut vp = Viewport::new(10, 3);
        vp.sync(25);
        vp.wheel(true, 25);
        vp.wheel(false, 25);
        assert!(vp.follow());
        vp.sync(50);
        assert!(vp.at_bottom());
    }

    #[test]
    fn test_anchor_applies_once() {
        let mut vp = Viewport::new(10, 3);
        vp.sync(100);
        vp.anchor_to(60);
        vp.sync(100);
        assert_eq!(vp.y_offset(), 60);
        assert!(!vp.at_bottom());
        vp.sync(120);
        assert_eq!(vp.y_offset(), 60);
    }

    #[test]
    fn test_anchor_is_clamped() {
        let mut vp = Viewport::new(10, 3);
        vp.anchor_to(95);
        vp.sync(100);
        assert_eq!(vp.y_offset(), 90);
    }

    #[test]
    fn test_short_content_is_always_at_bottom() {
        let mut vp = Viewport::new(10, 3);
        vp.sync(4);
        vp.wheel(true, 4);
        assert_eq!(vp.y_offset(), 0);
        assert!(vp.follow());
    }
}
