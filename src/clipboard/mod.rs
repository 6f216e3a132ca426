use anyhow::{Context, Result};
use arboard::Clipboard;

use crate::codec::PixelFrame;

/// Maximum clipboard text size (10MB)
const MAX_CLIPBOARD_SIZE: usize = 10 * 1024 * 1024;

/// Clipboard operations used by the toolkit (mocked in tests)
trait ClipboardProvider {
    fn set_text(&mut self, text: &str) -> Result<()>;
    /// Current clipboard image as (width, height, RGBA8 bytes)
    fn get_image(&mut self) -> Result<(usize, usize, Vec<u8>)>;
}

/// Real clipboard implementation using arboard
struct SystemClipboard {
    clipboard: Clipboard,
}

impl SystemClipboard {
    fn new() -> Result<Self> {
        let clipboard = Clipboard::new().context("Failed to initialize clipboard")?;
        Ok(Self { clipboard })
    }
}

impl ClipboardProvider for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.clipboard.set_text(text).context("Failed to set clipboard contents")?;
        Ok(())
    }

    fn get_image(&mut self) -> Result<(usize, usize, Vec<u8>)> {
        let image = self.clipboard.get_image().context("Clipboard does not contain an image")?;
        Ok((image.width, image.height, image.bytes.into_owned()))
    }
}

fn validate_clipboard_text(text: &str) -> Result<()> {
    if text.is_empty() {
        anyhow::bail!("Cannot copy empty text to clipboard");
    }

    if text.len() > MAX_CLIPBOARD_SIZE {
        anyhow::bail!(
            "Text too large for clipboard ({} bytes, max {})",
            text.len(),
            MAX_CLIPBOARD_SIZE
        );
    }

    Ok(())
}

fn copy_with_provider(text: &str, provider: &mut dyn ClipboardProvider) -> Result<()> {
    validate_clipboard_text(text)?;
    provider.set_text(text)
}

fn image_with_provider(provider: &mut dyn ClipboardProvider) -> Result<PixelFrame> {
    let (width, height, rgba) = provider.get_image()?;
    let width = u32::try_from(width).context("Clipboard image too wide")?;
    let height = u32::try_from(height).context("Clipboard image too tall")?;
    PixelFrame::from_rgba(width, height, rgba).context("Clipboard image is malformed")
}

/// Copy text to the system clipboard.
///
/// # Errors
/// Returns error if:
/// - Text is empty
/// - Text is too large for clipboard (>10MB)
/// - System clipboard is unavailable (headless environment)
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    // Validate before touching the system clipboard
    validate_clipboard_text(text)?;

    let mut clipboard = SystemClipboard::new()?;
    copy_with_provider(text, &mut clipboard)
}

/// Read the image currently on the system clipboard as a pixel frame
///
/// # Errors
/// Returns error if the clipboard is unavailable or holds no image.
pub fn read_clipboard_image() -> Result<PixelFrame> {
    let mut clipboard = SystemClipboard::new()?;
    image_with_provider(&mut clipboard)
}
