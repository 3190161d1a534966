//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Physical units (Hz, samples, frames)
//! - Documented ranges and meanings
//! - Validation at the configuration boundary

mod capture;
mod display;

// Re-export all types
pub use capture::CaptureConfig;
pub use display::{ColorScheme, DisplayConfig, DisplayMode, SharedDisplayConfig};
