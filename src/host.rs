//! Boundary to the surrounding GUI runtime
//!
//! The pipeline consumes these primitives and never implements them:
//! the embedding application wires them to its window and capture APIs.
//! Capture results travel as encoded PNG bytes, which is also how the
//! slices reach the stitcher.

use std::path::PathBuf;

use anyhow::Result;

use crate::domain::Region;

/// Viewport dimensions reported after maximizing for capture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Result of the save prompt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Image written to the chosen path
    Saved(PathBuf),
    /// User dismissed the dialog; nothing written
    Cancelled,
}

/// Window, capture and file primitives provided by the host application
pub trait HostBridge {
    /// Capture the given viewport region as PNG bytes
    fn capture_region(&mut self, region: Region) -> Result<Vec<u8>>;

    /// Enlarge the window to the full work area for capture
    fn maximize_for_capture(&mut self) -> Result<Viewport>;

    /// Undo `maximize_for_capture`
    fn restore_after_capture(&mut self) -> Result<()>;

    /// Ask the user for a destination and write the stitched image
    fn prompt_save_and_write(&mut self, png: &[u8]) -> Result<SaveOutcome>;

    /// Selection mode ended (captured, cancelled, or toggled off)
    fn notify_mode_ended(&mut self);
}

/// Timestamped default file name for a stitched screenshot
pub fn default_file_name() -> String {
    format!(
        "chat-screenshot-{}.png",
        chrono::Local::now().format("%Y-%m-%d-%H%M%S")
    )
}

/// Default destination: the user's Pictures folder, falling back to the
/// current directory when the platform has none
pub fn default_save_path() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(default_file_name())
}

/// Show a native save dialog seeded with the default name.
///
/// Returns `None` when the user cancels.
pub fn prompt_save_path() -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Save screenshot")
        .add_filter("PNG image", &["png"])
        .set_file_name(default_file_name());
    if let Some(pictures) = dirs::picture_dir() {
        dialog = dialog.set_directory(pictures);
    }
    dialog.save_file()
}
