//! Scroll-and-stitch screenshot capture for chat threads
//!
//! The pipeline selects a range of chat messages on a live page,
//! scrolls through it capturing overlapping viewport slices, and
//! stitches the slices into one tall image. The page and the GUI host
//! sit behind the [`page::Page`] and [`host::HostBridge`] traits, so
//! the whole flow runs unchanged against a real web view or against the
//! in-memory [`page::ScriptedPage`].

pub mod capture;
pub mod config;
pub mod domain;
pub mod host;
pub mod page;
pub mod stitch;
