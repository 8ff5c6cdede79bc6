//! The mutable build configuration entry plugins write into
//!
//! Mirrors the shape a caller would write in a config file:
//!
//! ```json
//! {
//!   "build": {
//!     "lib": { "entry": "...", "name": "...", "fileName": "..." },
//!     "rolldownOptions": {
//!       "input": { "<name>": "virtual:<name>" },
//!       "output": { "entryFileNames": "[name].js", "assetFileNames": "..." }
//!     }
//!   }
//! }
//! ```
//!
//! Keys this crate does not know about are preserved in `extra` maps at every
//! level. Sections are created on demand and never replaced.
//!
//! [`BuildConfig::to_bundler_options`] forwards the Rolldown keys it
//! understands (`external`, `platform`, `cwd`, and `format`, `dir`, `banner`,
//! `footer` under `output`) and warns about the rest.

use std::path::PathBuf;

use indexmap::IndexMap;
use rolldown::{BundlerOptions, InputItem, IsExternal, OutputFormat, Platform};
use rolldown_common::AddonOutputOption;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{MultiEntryError, Result};
use crate::naming::{AssetInfo, ChunkInfo, NamingChain};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildSection>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib: Option<LibrarySection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolldown_options: Option<BundlerSection>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySection {
    /// Module id of the library entry point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<LibraryName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `name = "Lib"` or `name = { name = "Lib" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LibraryName {
    Plain(String),
    Object { name: String },
}

impl LibraryName {
    pub fn as_str(&self) -> &str {
        match self {
            LibraryName::Plain(name) => name,
            LibraryName::Object { name } => name,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerSection {
    /// Named inputs in registration order
    #[serde(default)]
    pub input: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSection>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSection {
    #[serde(default, skip_serializing)]
    pub entry_file_names: Option<NamingChain<ChunkInfo>>,

    #[serde(default, skip_serializing)]
    pub asset_file_names: Option<NamingChain<AssetInfo>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BuildConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration tree from JSON
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn build_mut(&mut self) -> &mut BuildSection {
        self.build.get_or_insert_with(BuildSection::default)
    }

    pub fn library(&self) -> Option<&LibrarySection> {
        self.build.as_ref().and_then(|build| build.lib.as_ref())
    }

    /// The library name, whichever form it was declared in
    pub fn library_name(&self) -> Option<&str> {
        self.library()
            .and_then(|lib| lib.name.as_ref())
            .map(LibraryName::as_str)
    }

    pub fn bundler(&self) -> Option<&BundlerSection> {
        self.build
            .as_ref()
            .and_then(|build| build.rolldown_options.as_ref())
    }

    pub fn input(&self) -> Option<&IndexMap<String, String>> {
        self.bundler().map(|bundler| &bundler.input)
    }

    pub fn output(&self) -> Option<&OutputSection> {
        self.bundler().and_then(|bundler| bundler.output.as_ref())
    }

    /// Rolldown options for this configuration
    ///
    /// Carries every registered input in registration order, the naming
    /// chains as function-valued file name options, and the caller's bundler
    /// keys that map onto [`BundlerOptions`].
    pub fn to_bundler_options(&self) -> Result<BundlerOptions> {
        let mut options = BundlerOptions::default();

        let Some(bundler) = self.bundler() else {
            return Ok(options);
        };

        options.input = Some(
            bundler
                .input
                .iter()
                .map(|(name, import)| InputItem {
                    name: Some(name.clone()),
                    import: import.clone(),
                })
                .collect(),
        );

        for (key, value) in &bundler.extra {
            match key.as_str() {
                "external" => options.external = Some(IsExternal::from(string_list(key, value)?)),
                "platform" => options.platform = Some(parse_platform(value)?),
                "cwd" => options.cwd = Some(PathBuf::from(string_value(key, value)?)),
                _ => warn!(key = %key, "bundler option is not forwarded to Rolldown"),
            }
        }

        if let Some(output) = &bundler.output {
            options.entry_filenames = output
                .entry_file_names
                .as_ref()
                .map(NamingChain::<ChunkInfo>::to_rolldown);
            options.asset_filenames = output
                .asset_file_names
                .as_ref()
                .map(NamingChain::<AssetInfo>::to_rolldown);

            for (key, value) in &output.extra {
                match key.as_str() {
                    "format" => options.format = Some(parse_format(value)?),
                    "dir" => options.dir = Some(string_value(key, value)?),
                    "banner" => {
                        options.banner =
                            Some(AddonOutputOption::String(Some(string_value(key, value)?)))
                    }
                    "footer" => {
                        options.footer =
                            Some(AddonOutputOption::String(Some(string_value(key, value)?)))
                    }
                    _ => warn!(key = %key, "output option is not forwarded to Rolldown"),
                }
            }
        }

        Ok(options)
    }
}

fn invalid(key: &str, expected: &str, value: &Value) -> MultiEntryError {
    MultiEntryError::InvalidConfig {
        message: format!("`{key}` must be {expected}, got {value}"),
    }
}

fn string_value(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(key, "a string", value))
}

/// A single string or an array of strings
fn string_list(key: &str, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items.iter().map(|item| string_value(key, item)).collect(),
        other => Err(invalid(key, "a string or an array of strings", other)),
    }
}

fn parse_format(value: &Value) -> Result<OutputFormat> {
    match value.as_str() {
        Some("es" | "esm" | "module") => Ok(OutputFormat::Esm),
        Some("cjs" | "commonjs") => Ok(OutputFormat::Cjs),
        Some("iife") => Ok(OutputFormat::Iife),
        Some("umd") => Ok(OutputFormat::Umd),
        _ => Err(invalid("format", "one of es, cjs, iife, umd", value)),
    }
}

fn parse_platform(value: &Value) -> Result<Platform> {
    match value.as_str() {
        Some("node") => Ok(Platform::Node),
        Some("browser") => Ok(Platform::Browser),
        Some("neutral") => Ok(Platform::Neutral),
        _ => Err(invalid("platform", "one of node, browser, neutral", value)),
    }
}

impl BuildSection {
    pub fn lib_mut(&mut self) -> &mut LibrarySection {
        self.lib.get_or_insert_with(LibrarySection::default)
    }

    pub fn rolldown_options_mut(&mut self) -> &mut BundlerSection {
        self.rolldown_options
            .get_or_insert_with(BundlerSection::default)
    }
}

impl BundlerSection {
    pub fn output_mut(&mut self) -> &mut OutputSection {
        self.output.get_or_insert_with(OutputSection::default)
    }
}

impl OutputSection {
    pub fn entry_file_names_mut(&mut self) -> &mut NamingChain<ChunkInfo> {
        self.entry_file_names
            .get_or_insert_with(NamingChain::for_chunks)
    }

    pub fn asset_file_names_mut(&mut self) -> &mut NamingChain<AssetInfo> {
        self.asset_file_names
            .get_or_insert_with(NamingChain::for_assets)
    }
}
