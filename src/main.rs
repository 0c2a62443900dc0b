//! End-to-end demo: runs the capture pipeline against a scripted page
//! and writes the stitched PNG to the path given as the first argument,
//! or to a location picked in a save dialog.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use image::{Rgba, RgbaImage};

use chatshot::capture::{CancelFlag, CaptureResult, SessionManager};
use chatshot::config::CaptureConfig;
use chatshot::domain::{Rect, Region};
use chatshot::host::{self, HostBridge, SaveOutcome, Viewport};
use chatshot::page::ScriptedPage;
use chatshot::stitch;

/// Host double for the demo: slice pixels are synthesized as banded
/// gray so the stitch seams are visible in the output
struct DemoHost {
    out: PathBuf,
}

impl HostBridge for DemoHost {
    fn capture_region(&mut self, region: Region) -> Result<Vec<u8>> {
        let img = RgbaImage::from_fn(region.width, region.height, |_, y| {
            let v = if (y / 40) % 2 == 0 { 245 } else { 225 };
            Rgba([v, v, v, 255])
        });
        stitch::encode_png(&img)
    }

    fn maximize_for_capture(&mut self) -> Result<Viewport> {
        Ok(Viewport {
            width: 800,
            height: 600,
        })
    }

    fn restore_after_capture(&mut self) -> Result<()> {
        Ok(())
    }

    fn prompt_save_and_write(&mut self, png: &[u8]) -> Result<SaveOutcome> {
        std::fs::write(&self.out, png)
            .with_context(|| format!("writing screenshot to {}", self.out.display()))?;
        Ok(SaveOutcome::Saved(self.out.clone()))
    }

    fn notify_mode_ended(&mut self) {
        log::debug!("selection mode ended");
    }
}

/// An eight-turn conversation with a fixed input bar over it
fn demo_page() -> ScriptedPage {
    let mut page = ScriptedPage::new(800, 600);
    for i in 0..8 {
        let selector = if i % 2 == 0 {
            "user-query"
        } else {
            "model-response"
        };
        page.add_message(selector, i * 240, i * 240 + 220);
    }
    page.add_fixed(".input-area", Rect::new(0, 520, 800, 600));
    page
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let out = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => host::prompt_save_path().context("no destination chosen")?,
    };

    let mut page = demo_page();
    let mut bridge = DemoHost { out };
    let mut manager = SessionManager::new();
    let cfg = CaptureConfig::load();
    let cancel = CancelFlag::new();

    manager.toggle(&mut page, &mut bridge)?;
    let messages = manager
        .session()
        .context("session not active")?
        .messages()
        .to_vec();
    manager.click(&mut page, messages[1]);
    manager.click(&mut page, messages[6]);

    match manager.capture(&mut page, &mut bridge, &cfg, &cancel)? {
        CaptureResult::Saved(path) => {
            log::info!("stitched screenshot written to {}", path.display());
            Ok(())
        }
        other => bail!("capture did not produce a file: {other:?}"),
    }
}
