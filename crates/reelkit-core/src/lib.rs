//! Reelkit Core - Foundation types for the timeline and export engine
//!
//! This crate provides the fundamental types shared by the other crates:
//! - Time representation (MediaTime, FrameRate, TimeRange)
//! - Frame geometry (Resolution, AspectRatio, PixelRect)
//! - Imported media and the read-only catalog
//! - Configuration and persistence errors

pub mod error;
pub mod geometry;
pub mod media;
pub mod time;

pub use error::{ReelkitError, Result};
pub use geometry::{AspectRatio, PixelRect, Resolution};
pub use media::{InMemoryCatalog, MediaCatalog, MediaId, MediaItem, MediaKind};
pub use time::{FrameRate, MediaTime, TimeRange};
