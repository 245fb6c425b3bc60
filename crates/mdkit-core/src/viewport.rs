//! Scroll position of a rendered document inside a fixed-size window.
//!
//! `y` counts rendered lines and `x` counts grapheme columns. Every mutation clamps the position
//! so the window never scrolls past the content.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewportState {
    pub x: u32,
    pub y: u32,
    pub viewport_w: u16,
    pub viewport_h: u16,
    pub content_w: u32,
    pub content_h: u32,
}

impl ViewportState {
    pub fn set_viewport(&mut self, w: u16, h: u16) {
        self.viewport_w = w;
        self.viewport_h = h;
        self.clamp();
    }

    pub fn set_content(&mut self, w: u32, h: u32) {
        self.content_w = w;
        self.content_h = h;
        self.clamp();
    }

    pub fn clamp(&mut self) {
        self.y = self.y.min(self.max_y());
        self.x = self.x.min(self.max_x());
    }

    pub fn scroll_y_by(&mut self, delta: i32) {
        self.y = offset_by(self.y, delta, self.max_y());
    }

    pub fn scroll_x_by(&mut self, delta: i32) {
        self.x = offset_by(self.x, delta, self.max_x());
    }

    /// Scrolls by a full window height.
    pub fn page_down(&mut self) {
        self.scroll_y_by(i32::from(self.viewport_h));
    }

    pub fn page_up(&mut self) {
        self.scroll_y_by(-i32::from(self.viewport_h));
    }

    pub fn to_top(&mut self) {
        self.y = 0;
        self.x = 0;
    }

    pub fn to_bottom(&mut self) {
        self.y = self.max_y();
        self.x = 0;
    }

    /// Puts `line` at the top of the window, as far as the content allows.
    pub fn scroll_to_line(&mut self, line: u32) {
        self.y = line.min(self.max_y());
    }

    /// Index one past the last line currently in the window.
    pub fn last_visible_line(&self) -> u32 {
        self.y
            .saturating_add(u32::from(self.viewport_h))
            .min(self.content_h)
    }

    /// How far through the document the bottom of the window is, in whole percent.
    pub fn percent_y(&self) -> Option<u8> {
        if self.content_h == 0 {
            return None;
        }
        let pct = u64::from(self.last_visible_line()) * 100 / u64::from(self.content_h);
        Some(pct.min(100) as u8)
    }

    fn max_y(&self) -> u32 {
        self.content_h.saturating_sub(u32::from(self.viewport_h))
    }

    fn max_x(&self) -> u32 {
        self.content_w.saturating_sub(u32::from(self.viewport_w))
    }
}

fn offset_by(value: u32, delta: i32, max: u32) -> u32 {
    (i64::from(value) + i64::from(delta)).clamp(0, i64::from(max)) as u32
}
