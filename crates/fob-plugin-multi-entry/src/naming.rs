//! Output naming chains
//!
//! Several plugins (one per entry) each want to name a few outputs and leave
//! everything else alone. Instead of wrapping closures in closures, naming is
//! an explicit ordered chain:
//!
//! ```text
//! custom(entry N) → … → custom(entry 1) → caller pattern → default pattern
//! ```
//!
//! The first custom strategy that answers wins and yields an exact file name.
//! A pattern ends the chain; patterns are rendered by Rolldown itself.
//!
//! A chain is handed to Rolldown as a function-valued `entryFileNames` /
//! `assetFileNames` option, so names are chosen before rendering and every
//! cross-chunk reference points at the final file.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rolldown_common::{
    AssetFilenamesOutputOption, ChunkFilenamesOutputOption, RollupPreRenderedAsset,
    RollupPreRenderedChunk, StrOrBytes,
};
use serde::{Deserialize, Deserializer};

/// Rolldown's default entry chunk pattern
pub const DEFAULT_CHUNK_PATTERN: &str = "[name].js";

/// Rolldown's default asset pattern
pub const DEFAULT_ASSET_PATTERN: &str = "assets/[name]-[hash][extname]";

/// What the naming function sees for a chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkInfo {
    pub name: String,
    pub facade_module_id: Option<String>,
    pub is_entry: bool,
}

impl ChunkInfo {
    pub fn from_rolldown(chunk: &RollupPreRenderedChunk) -> Self {
        Self {
            name: chunk.name.to_string(),
            facade_module_id: chunk.facade_module_id.as_ref().map(|id| id.to_string()),
            is_entry: chunk.is_entry,
        }
    }
}

/// What the naming function sees for an asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub names: Vec<String>,
    pub original_file_names: Vec<String>,
    pub source_len: usize,
}

impl AssetInfo {
    pub fn from_rolldown(asset: &RollupPreRenderedAsset) -> Self {
        let source_len = match &asset.source {
            StrOrBytes::Str(s) => s.len(),
            StrOrBytes::Bytes(b) => b.len(),
        };

        Self {
            names: asset.names.iter().map(|n| n.to_string()).collect(),
            original_file_names: asset.original_file_names.iter().map(|n| n.to_string()).collect(),
            source_len,
        }
    }

    /// Whether the asset declares `id` as its name or original file name
    pub fn declares(&self, id: &str) -> bool {
        self.original_file_names.iter().any(|name| name == id)
            || self.names.iter().any(|name| name == id)
    }

    pub fn has_source(&self) -> bool {
        self.source_len > 0
    }
}

/// Result of running a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileName {
    /// A literal file name chosen by a custom strategy
    Exact(String),
    /// A template for the bundler to render (`[name]`, `[hash]`, ...)
    Pattern(String),
}

impl FileName {
    pub fn exact(&self) -> Option<&str> {
        match self {
            FileName::Exact(name) => Some(name),
            FileName::Pattern(_) => None,
        }
    }
}

pub type NamingFn<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// One link of a [`NamingChain`]
pub enum NamingStrategy<T> {
    Pattern(String),
    Custom(NamingFn<T>),
}

impl<T> Clone for NamingStrategy<T> {
    fn clone(&self) -> Self {
        match self {
            NamingStrategy::Pattern(pattern) => NamingStrategy::Pattern(pattern.clone()),
            NamingStrategy::Custom(f) => NamingStrategy::Custom(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for NamingStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingStrategy::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
            NamingStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Ordered naming strategies with a default pattern at the end
pub struct NamingChain<T> {
    strategies: Vec<NamingStrategy<T>>,
    default_pattern: String,
}

impl<T> NamingChain<T> {
    pub fn new(default_pattern: impl Into<String>) -> Self {
        Self {
            strategies: Vec::new(),
            default_pattern: default_pattern.into(),
        }
    }

    /// Add a strategy ahead of every existing one
    pub fn prepend(&mut self, strategy: NamingStrategy<T>) -> &mut Self {
        self.strategies.insert(0, strategy);
        self
    }

    pub fn prepend_custom<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.prepend(NamingStrategy::Custom(Arc::new(f)))
    }

    /// Add a strategy after the existing ones, before the default
    pub fn push(&mut self, strategy: NamingStrategy<T>) -> &mut Self {
        self.strategies.push(strategy);
        self
    }

    pub fn resolve(&self, info: &T) -> FileName {
        for strategy in &self.strategies {
            match strategy {
                NamingStrategy::Custom(f) => {
                    if let Some(name) = f(info) {
                        return FileName::Exact(name);
                    }
                }
                NamingStrategy::Pattern(pattern) => return FileName::Pattern(pattern.clone()),
            }
        }

        FileName::Pattern(self.default_pattern.clone())
    }

    /// Whether any strategy needs to run code to pick a name
    pub fn has_custom(&self) -> bool {
        self.strategies
            .iter()
            .any(|strategy| matches!(strategy, NamingStrategy::Custom(_)))
    }

    /// The pattern this chain ends in when no custom strategy answers
    fn fallback_pattern(&self) -> String {
        self.strategies
            .iter()
            .find_map(|strategy| match strategy {
                NamingStrategy::Pattern(pattern) => Some(pattern.clone()),
                NamingStrategy::Custom(_) => None,
            })
            .unwrap_or_else(|| self.default_pattern.clone())
    }
}

type FileNameFuture = Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'static>>;

fn ready_file_name(name: FileName) -> FileNameFuture {
    let name = match name {
        FileName::Exact(name) | FileName::Pattern(name) => name,
    };
    Box::pin(std::future::ready(Ok(name)))
}

impl NamingChain<ChunkInfo> {
    pub fn for_chunks() -> Self {
        Self::new(DEFAULT_CHUNK_PATTERN)
    }
}

impl NamingChain<ChunkInfo> {
    /// Rolldown `entryFileNames` option running this chain
    ///
    /// An exact name has no placeholders, so Rolldown keeps it as is; a
    /// pattern result is rendered like any configured pattern.
    pub fn to_rolldown(&self) -> ChunkFilenamesOutputOption {
        if !self.has_custom() {
            return ChunkFilenamesOutputOption::String(self.fallback_pattern());
        }

        let chain = self.clone();
        ChunkFilenamesOutputOption::Fn(Arc::new(
            move |chunk: &RollupPreRenderedChunk| -> FileNameFuture {
                ready_file_name(chain.resolve(&ChunkInfo::from_rolldown(chunk)))
            },
        ))
    }
}

impl NamingChain<AssetInfo> {
    pub fn for_assets() -> Self {
        Self::new(DEFAULT_ASSET_PATTERN)
    }

    /// Rolldown `assetFileNames` option running this chain
    pub fn to_rolldown(&self) -> AssetFilenamesOutputOption {
        if !self.has_custom() {
            return AssetFilenamesOutputOption::String(self.fallback_pattern());
        }

        let chain = self.clone();
        AssetFilenamesOutputOption::Fn(Arc::new(
            move |asset: &RollupPreRenderedAsset| -> FileNameFuture {
                ready_file_name(chain.resolve(&AssetInfo::from_rolldown(asset)))
            },
        ))
    }
}

impl Default for NamingChain<ChunkInfo> {
    fn default() -> Self {
        Self::for_chunks()
    }
}

impl Default for NamingChain<AssetInfo> {
    fn default() -> Self {
        Self::for_assets()
    }
}

impl<T> Clone for NamingChain<T> {
    fn clone(&self) -> Self {
        Self {
            strategies: self.strategies.clone(),
            default_pattern: self.default_pattern.clone(),
        }
    }
}

impl<T> fmt::Debug for NamingChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamingChain")
            .field("strategies", &self.strategies)
            .field("default_pattern", &self.default_pattern)
            .finish()
    }
}

/// A pattern string in a config file becomes a one-link chain
impl<'de, T> Deserialize<'de> for NamingChain<T>
where
    NamingChain<T>: Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pattern = String::deserialize(deserializer)?;
        let mut chain = Self::default();
        chain.push(NamingStrategy::Pattern(pattern));
        Ok(chain)
    }
}
