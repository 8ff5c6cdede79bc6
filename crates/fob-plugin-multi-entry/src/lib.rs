//! Rolldown plugin for virtual multi-entry builds
//!
//! Each named entry is an ordered list of files. The plugin exposes it as a
//! virtual module `virtual:<name>` whose generated source imports (or, for a
//! library, re-exports) every file in order, so the bundler produces one
//! output per entry.
//!
//! ## Architecture
//!
//! ```text
//! MultiEntryOptions ─normalize→ Entry ×N ─multi_entry()→ FobMultiEntryPlugin ×N
//!                                                              │
//!        BuildConfig ◄──────────── configure() ────────────────┤
//!             │                                                │ shared BuildSession
//!             └─ to_bundler_options() → inputs, file name fns   │ (duplicate records)
//! ```
//!
//! Library entries are named `<name>.js`; application entries made only of
//! stylesheets are named `<name>.css`. When `enforce` is set, a style-only
//! entry whose output the bundler dropped as a duplicate is re-emitted under
//! its own name.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fob_plugin_multi_entry::{BuildConfig, MultiEntryOptions, PluginSettings, multi_entry};
//!
//! # fn example() -> fob_plugin_multi_entry::Result<()> {
//! let options = MultiEntryOptions::from_file("multi-entry.toml")?;
//! let plugins = multi_entry(&options, PluginSettings::from_env()?);
//!
//! let mut config = BuildConfig::new();
//! for plugin in &plugins {
//!     plugin.configure(&mut config);
//! }
//!
//! let bundler_options = config.to_bundler_options()?;
//! // Hand `bundler_options` and every entry plugin to Rolldown
//! # Ok(())
//! # }
//! ```

pub mod build_config;
pub mod entry;
mod error;
pub mod naming;
pub mod options;
pub mod plugin;
pub mod reconcile;
pub mod session;
pub mod virtual_module;

#[cfg(feature = "logging")]
pub mod logging;

pub use build_config::{BuildConfig, LibraryName};
pub use entry::{Entry, EntryKind};
pub use error::{MultiEntryError, Result};
pub use naming::{AssetInfo, ChunkInfo, FileName, NamingChain, NamingStrategy};
pub use options::{MultiEntryOptions, PluginSettings};
pub use plugin::{FobMultiEntryPlugin, multi_entry};
pub use reconcile::{EmittedContent, Reemission};
pub use session::BuildSession;
pub use virtual_module::VirtualId;
