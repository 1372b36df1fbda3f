use parking_lot::RwLock;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

/// Source of the host document's vertical scroll offset, in pixels. Values
/// become more negative as the page scrolls down. Sampled once per tick.
pub trait ScrollSource {
    fn scroll_offset(&self) -> f32;
}

/// Scroll source pinned to a single value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedScroll(pub f32);

impl ScrollSource for FixedScroll {
    fn scroll_offset(&self) -> f32 {
        self.0
    }
}

/// Simulated document scroll driven by mouse-wheel input on native windows.
#[derive(Debug)]
pub struct WheelScroll {
    offset: RwLock<f32>,
    page_length: f32,
}

impl WheelScroll {
    /// `page_length` is how far, in pixels, the simulated page can scroll.
    pub fn new(page_length: f32) -> Self {
        Self {
            offset: RwLock::new(0.0),
            page_length: page_length.max(0.0),
        }
    }

    /// Applies a wheel delta. Positive deltas scroll up, towards the top of the page.
    pub fn scroll_by(&self, delta_pixels: f32) {
        let mut offset = self.offset.write();
        *offset = (*offset + delta_pixels).clamp(-self.page_length, 0.0);
    }

    pub fn page_length(&self) -> f32 {
        self.page_length
    }
}

impl ScrollSource for WheelScroll {
    fn scroll_offset(&self) -> f32 {
        *self.offset.read()
    }
}

impl<T> ScrollSource for std::sync::Arc<T>
where
    T: ScrollSource + ?Sized,
{
    fn scroll_offset(&self) -> f32 {
        (**self).scroll_offset()
    }
}
