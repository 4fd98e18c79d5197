// services/log-viewer/src/clipboard.rs
//
// Clipboard seam for the detail pane's copy actions

use svckit::ViewerError;

pub trait Clipboard: Send {
    fn set(&mut self, contents: &str) -> Result<(), ViewerError>;
}

/// System clipboard, opened on first use.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self { inner: None }
    }

    fn ensure(&mut self) -> Result<&mut arboard::Clipboard, ViewerError> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| ViewerError::ClipboardError(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| ViewerError::ClipboardError("clipboard unavailable".to_string()))
    }
}

impl Clipboard for SystemClipboard {
    fn set(&mut self, contents: &str) -> Result<(), ViewerError> {
        self.ensure()?
            .set_text(contents.to_string())
            .map_err(|e| ViewerError::ClipboardError(e.to_string()))
    }
}
