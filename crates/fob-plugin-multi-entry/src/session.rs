//! Build-scoped state shared by every entry plugin of one build
//!
//! A [`BuildSession`] is created by [`crate::multi_entry`] and handed to each
//! per-entry plugin behind an `Arc`. Nothing in it outlives the build, and two
//! builds never share a session.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::options::PluginSettings;

/// Content fingerprint of a generated module
pub type Fingerprint = blake3::Hash;

pub fn fingerprint(source: &str) -> Fingerprint {
    blake3::hash(source.as_bytes())
}

/// Which entries generated byte-identical module source
///
/// An entry name is in `duplicates` iff an earlier-recorded entry produced the
/// same source text.
#[derive(Debug, Default)]
pub struct GenerationRecord {
    first_by_fingerprint: FxHashMap<Fingerprint, String>,
    duplicates: FxHashMap<String, String>,
}

impl GenerationRecord {
    /// Record that `entry_name` generated `source`
    ///
    /// Returns the name of the earlier entry this one duplicates, if any.
    /// Recording the same entry twice does not mark it as its own duplicate.
    pub fn record(&mut self, entry_name: &str, source: &str) -> Option<String> {
        let key = fingerprint(source);
        match self.first_by_fingerprint.get(&key) {
            Some(first) if first != entry_name => {
                self.duplicates
                    .insert(entry_name.to_string(), first.clone());
                Some(first.clone())
            }
            Some(_) => None,
            None => {
                self.first_by_fingerprint
                    .insert(key, entry_name.to_string());
                None
            }
        }
    }

    pub fn duplicate_of(&self, entry_name: &str) -> Option<&str> {
        self.duplicates.get(entry_name).map(String::as_str)
    }
}

/// State owned by a single build invocation
#[derive(Debug, Default)]
pub struct BuildSession {
    settings: PluginSettings,
    record: Mutex<GenerationRecord>,
    library_name: Mutex<Option<String>>,
}

impl BuildSession {
    pub fn new(settings: PluginSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    /// Library name declared by the build configuration, if any
    pub fn library_name(&self) -> Option<String> {
        self.library_name.lock().clone()
    }

    pub fn set_library_name(&self, name: Option<String>) {
        *self.library_name.lock() = name;
    }

    /// See [`GenerationRecord::record`]
    pub fn record_generation(&self, entry_name: &str, source: &str) -> Option<String> {
        self.record.lock().record(entry_name, source)
    }

    pub fn duplicate_of(&self, entry_name: &str) -> Option<String> {
        self.record.lock().duplicate_of(entry_name).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_producer_is_not_a_duplicate() {
        let mut record = GenerationRecord::default();
        assert_eq!(record.record("a", "import \"x.css\";"), None);
        assert_eq!(record.duplicate_of("a"), None);
        assert_eq!(record.record("b", "import \"y.css\";"), None);
    }

    #[test]
    fn test_identical_source_marks_later_entry() {
        let mut record = GenerationRecord::default();
        record.record("a", "same");
        assert_eq!(record.record("b", "same"), Some("a".to_string()));
        assert_eq!(record.record("c", "same"), Some("a".to_string()));
        assert_eq!(record.duplicate_of("b"), Some("a"));
        assert_eq!(record.duplicate_of("c"), Some("a"));
        assert_eq!(record.duplicate_of("a"), None);
    }

    #[test]
    fn test_different_source_is_independent() {
        let mut record = GenerationRecord::default();
        record.record("a", "one");
        assert_eq!(record.record("b", "two"), None);
        assert_eq!(record.duplicate_of("b"), None);
    }

    #[test]
    fn test_reloading_same_entry_is_idempotent() {
        let mut record = GenerationRecord::default();
        record.record("a", "same");
        assert_eq!(record.record("a", "same"), None);
        assert_eq!(record.duplicate_of("a"), None);
    }

    #[test]
    fn test_sessions_do_not_share_state() {
        let first = BuildSession::default();
        let second = BuildSession::default();

        first.record_generation("a", "same");
        first.record_generation("b", "same");

        assert_eq!(first.duplicate_of("b"), Some("a".to_string()));
        second.record_generation("b", "same");
        assert_eq!(second.duplicate_of("b"), None);
    }

    #[test]
    fn test_library_name_roundtrip() {
        let session = BuildSession::new(PluginSettings { enforce: true });
        assert!(session.settings().enforce);
        assert_eq!(session.library_name(), None);
        session.set_library_name(Some("Components".to_string()));
        assert_eq!(session.library_name().as_deref(), Some("Components"));
    }
}
