//! Theme resolution: builtin palettes overlaid with user color overrides.

pub mod palette;
pub mod service;

pub use palette::{ColorOverrides, ThemePalette, ThemeVariant};
pub use service::ThemeService;
