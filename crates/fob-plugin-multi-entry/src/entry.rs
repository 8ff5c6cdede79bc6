//! Normalized entry model
//!
//! An [`Entry`] is one logical build input: a name, an ordered list of file
//! references and a kind that decides how the files are stitched together in
//! the synthesized virtual module.

use serde::{Deserialize, Serialize};

use crate::virtual_module::VirtualId;

/// File extension that marks a file reference as a stylesheet
pub const STYLE_EXTENSION: &str = ".css";

/// How the files of an entry are referenced from its virtual module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Files are imported for their side effects (`import "file";`)
    #[serde(rename = "app")]
    Application,
    /// Files are re-exported as namespace bindings (`export * as name from "file";`)
    #[serde(rename = "lib")]
    Library,
}

impl EntryKind {
    /// Short name used in configuration files and log output
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Application => "app",
            EntryKind::Library => "lib",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, ordered list of files treated as a single build input
///
/// Entries are immutable once built. File order is significant: it is the
/// order of the statements in the generated module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    files: Vec<String>,
    kind: EntryKind,
}

impl Entry {
    pub fn new(name: impl Into<String>, files: Vec<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            files,
            kind,
        }
    }

    /// Shorthand for an [`EntryKind::Application`] entry
    pub fn application(name: impl Into<String>, files: Vec<String>) -> Self {
        Self::new(name, files, EntryKind::Application)
    }

    /// Shorthand for an [`EntryKind::Library`] entry
    pub fn library(name: impl Into<String>, files: Vec<String>) -> Self {
        Self::new(name, files, EntryKind::Library)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// True when every file reference is a stylesheet
    ///
    /// Computed on every call. An entry without files is vacuously style-only.
    pub fn is_style_only(&self) -> bool {
        self.files.iter().all(|file| file.ends_with(STYLE_EXTENSION))
    }

    /// The `virtual:<name>` identifier correlating this entry across hooks
    pub fn virtual_id(&self) -> VirtualId {
        VirtualId::for_entry(&self.name)
    }

    /// Output file name for library entries (`<name>.js`)
    pub fn script_file_name(&self) -> String {
        format!("{}.js", self.name)
    }

    /// Output file name for style-only entries (`<name>.css`)
    pub fn style_file_name(&self) -> String {
        style_file_name(&self.name)
    }
}

/// Expected stylesheet output for an entry name
pub(crate) fn style_file_name(name: &str) -> String {
    format!("{}{}", name, STYLE_EXTENSION)
}
