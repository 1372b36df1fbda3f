use anyhow::{anyhow, Result};
use web_sys::{window, HtmlElement};

use super::ScrollSource;

/// Reads the scroll offset as the top edge of `document.body`.
pub struct DocumentScroll {
    body: HtmlElement,
}

impl DocumentScroll {
    pub fn attach() -> Result<Self> {
        let window = window().ok_or_else(|| anyhow!("window not available"))?;
        let document = window
            .document()
            .ok_or_else(|| anyhow!("document not available"))?;
        let body = document
            .body()
            .ok_or_else(|| anyhow!("document has no body"))?;
        Ok(Self { body })
    }
}

impl ScrollSource for DocumentScroll {
    fn scroll_offset(&self) -> f32 {
        self.body.get_bounding_client_rect().top() as f32
    }
}
