//! Caller-facing configuration
//!
//! Two shapes are accepted:
//!
//! ```toml
//! # A single library entry
//! name = "components"
//! files = ["src/button.js", "src/card.js"]
//! type = "lib"
//! ```
//!
//! ```toml
//! # Any number of application entries
//! [styles]
//! files = ["src/reset.css", "src/theme.css"]
//! type = "app"
//!
//! [main]
//! files = ["src/polyfills.js", "src/app.js"]
//! type = "app"
//! ```
//!
//! Settings (`enforce`) are passed separately and can also come from the
//! `FOB_MULTI_ENTRY_ENFORCE` environment variable.

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::{MultiEntryError, Result};

/// Environment prefix for [`PluginSettings`]
pub const SETTINGS_ENV_PREFIX: &str = "FOB_MULTI_ENTRY_";

/// `type = "app"`, the only type allowed in the application mapping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationType {
    #[default]
    #[serde(rename = "app")]
    App,
}

/// `type = "lib"`, the only type allowed for the single library entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibraryType {
    #[default]
    #[serde(rename = "lib")]
    Lib,
}

/// One application entry in the mapping form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOptions {
    /// Files in import order; may be empty
    pub files: Vec<String>,

    #[serde(rename = "type", default)]
    pub kind: ApplicationType,
}

/// The single library entry form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryOptions {
    /// Entry name, also the default library name
    pub name: String,

    /// Files in re-export order; may be empty
    pub files: Vec<String>,

    #[serde(rename = "type", default)]
    pub kind: LibraryType,
}

/// Either one library entry or a mapping of application entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MultiEntryOptions {
    Library(LibraryOptions),
    Applications(IndexMap<String, EntryOptions>),
}

impl MultiEntryOptions {
    /// Single library entry
    pub fn library(name: impl Into<String>, files: Vec<String>) -> Self {
        MultiEntryOptions::Library(LibraryOptions {
            name: name.into(),
            files,
            kind: LibraryType::Lib,
        })
    }

    /// Application entries keyed by name
    pub fn applications<I, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, Vec<String>)>,
        N: Into<String>,
    {
        MultiEntryOptions::Applications(
            entries
                .into_iter()
                .map(|(name, files)| {
                    (
                        name.into(),
                        EntryOptions {
                            files,
                            kind: ApplicationType::App,
                        },
                    )
                })
                .collect(),
        )
    }

    /// Parse options from an already-decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Load options from a `.toml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MultiEntryError::ConfigNotFound(path.to_path_buf()));
        }

        Ok(Self::figment(path)?.extract()?)
    }

    /// Figment for a config file, picked by extension
    pub fn figment(path: &Path) -> Result<Figment> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Figment::from(Toml::file(path))),
            Some("json") => Ok(Figment::from(Json::file(path))),
            other => Err(MultiEntryError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Produce the uniform `name -> entry` mapping
    pub fn normalize(&self) -> IndexMap<String, Entry> {
        match self {
            MultiEntryOptions::Library(lib) => {
                let entry = Entry::library(lib.name.clone(), lib.files.clone());
                IndexMap::from([(lib.name.clone(), entry)])
            }
            MultiEntryOptions::Applications(apps) => apps
                .iter()
                .map(|(name, options)| {
                    (
                        name.clone(),
                        Entry::application(name.clone(), options.files.clone()),
                    )
                })
                .collect(),
        }
    }
}

/// Build-wide plugin settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Re-emit style-only outputs the bundler deduplicated away
    #[serde(default)]
    pub enforce: bool,
}

impl PluginSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enforce(mut self, enforce: bool) -> Self {
        self.enforce = enforce;
        self
    }

    /// Defaults overridden by `FOB_MULTI_ENTRY_*` environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(SETTINGS_ENV_PREFIX))
            .extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use serde_json::json;

    #[test]
    fn test_library_form() {
        let options = MultiEntryOptions::from_value(json!({
            "name": "components",
            "files": ["a.js", "b.js"],
            "type": "lib"
        }))
        .unwrap();

        let entries = options.normalize();
        assert_eq!(entries.len(), 1);
        let entry = &entries["components"];
        assert_eq!(entry.kind(), EntryKind::Library);
        assert_eq!(entry.files(), ["a.js", "b.js"]);
    }

    #[test]
    fn test_application_form() {
        let options = MultiEntryOptions::from_value(json!({
            "styles": { "files": ["s.css", "u.css"], "type": "app" },
            "main": { "files": ["main.js"], "type": "app" }
        }))
        .unwrap();

        let entries = options.normalize();
        assert_eq!(entries.len(), 2);
        assert!(
            entries
                .values()
                .all(|entry| entry.kind() == EntryKind::Application)
        );
        assert_eq!(entries["styles"].files(), ["s.css", "u.css"]);
        assert_eq!(entries["main"].name(), "main");
    }

    #[test]
    fn test_empty_file_list_is_legal() {
        let options = MultiEntryOptions::from_value(json!({
            "empty": { "files": [], "type": "app" }
        }))
        .unwrap();
        assert!(options.normalize()["empty"].files().is_empty());
    }

    #[test]
    fn test_lib_type_rejected_in_application_mapping() {
        let result = MultiEntryOptions::from_value(json!({
            "components": { "files": ["a.js"], "type": "lib" }
        }));
        assert!(matches!(
            result,
            Err(MultiEntryError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_builders_match_parsed_forms() {
        let built = MultiEntryOptions::applications([("styles", vec!["s.css".to_string()])]);
        let parsed = MultiEntryOptions::from_value(json!({
            "styles": { "files": ["s.css"] }
        }))
        .unwrap();
        assert_eq!(built, parsed);

        let lib = MultiEntryOptions::library("components", vec![]);
        assert_eq!(lib.normalize()["components"].kind(), EntryKind::Library);
    }

    #[test]
    fn test_from_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "entries.toml",
                r#"
                [styles]
                files = ["s.css", "u.css"]
                type = "app"
                "#,
            )?;

            let options = MultiEntryOptions::from_file("entries.toml").expect("valid config");
            let entries = options.normalize();
            assert_eq!(entries["styles"].files(), ["s.css", "u.css"]);
            assert!(entries["styles"].is_style_only());
            Ok(())
        });
    }

    #[test]
    fn test_from_json_library_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "entries.json",
                r#"{ "name": "components", "files": ["a.js"], "type": "lib" }"#,
            )?;

            let options = MultiEntryOptions::from_file("entries.json").expect("valid config");
            assert_eq!(
                options.normalize()["components"].kind(),
                EntryKind::Library
            );
            Ok(())
        });
    }

    #[test]
    fn test_missing_file() {
        let result = MultiEntryOptions::from_file("does/not/exist.toml");
        assert!(matches!(result, Err(MultiEntryError::ConfigNotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = MultiEntryOptions::figment(Path::new("entries.yaml"));
        assert!(matches!(
            result,
            Err(MultiEntryError::UnsupportedFormat(ext)) if ext == "yaml"
        ));
    }

    #[test]
    fn test_settings_default_and_env() {
        assert!(!PluginSettings::default().enforce);
        assert!(PluginSettings::new().with_enforce(true).enforce);

        figment::Jail::expect_with(|jail| {
            assert!(!PluginSettings::from_env().expect("defaults").enforce);
            jail.set_env("FOB_MULTI_ENTRY_ENFORCE", "true");
            assert!(PluginSettings::from_env().expect("env settings").enforce);
            Ok(())
        });
    }
}
