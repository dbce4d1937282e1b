//! Reelkit Export - platform-aware export resolution
//!
//! This crate handles:
//! - Codec and container compatibility
//! - The platform capability table
//! - Resolving a timeline into an encode plan, or a typed rejection
//! - Carrying watermark and publishing metadata into the plan
//!
//! Encoding itself happens elsewhere; the plan is handed to a transcoder.

pub mod codec;
pub mod config;
pub mod options;
pub mod plan;
pub mod platform;
pub mod resolver;

pub use codec::{AudioCodec, Container, VideoCodec};
pub use config::{ExportQuality, ResolverConfig};
pub use options::{ExportOptions, Watermark, WatermarkPosition};
pub use plan::{AspectHandling, ExportPlan, GlobalAdjustment, Rejection};
pub use platform::{Platform, PlatformProfile, PlatformRegistry, PROFILE_TABLE_VERSION};
pub use resolver::ExportResolver;
