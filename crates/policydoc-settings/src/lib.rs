//! # policydoc-settings
//!
//! Configuration with layered sources for the documentation generator.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`DocSettings::default()`]
//! 2. **Settings file**: `--config <FILE>`, or `./.policydoc.json` when
//!    present (deep-merged over defaults)
//! 3. **Environment variables**: `POLICYDOC_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    IgnoredOverride, LoadedSettings, deep_merge, load_settings, load_settings_from_path,
    load_with_env, settings_path,
};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
