//! Re-emission of style-only outputs the bundler deduplicated away
//!
//! Rolldown collapses byte-identical assets into one file. When two
//! style-only entries render to the same CSS, only the first entry's
//! `<name>.css` survives. With `enforce` set, the later entries get their own
//! copy back.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;

use rolldown_common::{Output, OutputAsset, StrOrBytes};

use crate::entry::{Entry, style_file_name};
use crate::session::BuildSession;

/// Content of an emitted file, copied verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmittedContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl From<&StrOrBytes> for EmittedContent {
    fn from(source: &StrOrBytes) -> Self {
        match source {
            StrOrBytes::Str(s) => EmittedContent::Text(s.clone()),
            StrOrBytes::Bytes(b) => EmittedContent::Bytes(b.clone()),
        }
    }
}

impl From<EmittedContent> for StrOrBytes {
    fn from(content: EmittedContent) -> Self {
        match content {
            EmittedContent::Text(s) => StrOrBytes::Str(s),
            EmittedContent::Bytes(b) => StrOrBytes::Bytes(b),
        }
    }
}

/// Read access to the finished bundle, keyed by output file name
pub trait BundleLookup {
    fn has_file(&self, file_name: &str) -> bool;

    /// Asset source or chunk code of `file_name`
    fn file_content(&self, file_name: &str) -> Option<EmittedContent>;
}

impl BundleLookup for [Output] {
    fn has_file(&self, file_name: &str) -> bool {
        self.iter().any(|output| output_file_name(output) == file_name)
    }

    fn file_content(&self, file_name: &str) -> Option<EmittedContent> {
        self.iter()
            .find(|output| output_file_name(output) == file_name)
            .map(|output| match output {
                Output::Asset(asset) => EmittedContent::from(&asset.source),
                Output::Chunk(chunk) => EmittedContent::Text(chunk.code.clone()),
            })
    }
}

impl<S: BuildHasher> BundleLookup for HashMap<String, EmittedContent, S> {
    fn has_file(&self, file_name: &str) -> bool {
        self.contains_key(file_name)
    }

    fn file_content(&self, file_name: &str) -> Option<EmittedContent> {
        self.get(file_name).cloned()
    }
}

fn output_file_name(output: &Output) -> &str {
    match output {
        Output::Asset(asset) => asset.filename.as_str(),
        Output::Chunk(chunk) => chunk.filename.as_str(),
    }
}

/// One extra asset to add to the bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reemission {
    pub file_name: String,
    /// Logical name of the asset, the entry name
    pub name: String,
    pub content: EmittedContent,
    /// Entry whose output the content was copied from
    pub copied_from: String,
}

impl Reemission {
    pub fn into_output(self) -> Output {
        Output::Asset(Arc::new(OutputAsset {
            names: vec![self.name],
            original_file_names: vec![],
            filename: self.file_name.into(),
            source: self.content.into(),
        }))
    }
}

/// Decide whether `entry` needs its stylesheet re-emitted
///
/// Every "no" is quiet: enforcement off, not style-only, output already
/// present, no recorded duplicate, or nothing to copy from.
pub fn reconcile<B>(entry: &Entry, session: &BuildSession, bundle: &B) -> Option<Reemission>
where
    B: BundleLookup + ?Sized,
{
    if !session.settings().enforce || !entry.is_style_only() {
        return None;
    }

    let file_name = entry.style_file_name();
    if bundle.has_file(&file_name) {
        return None;
    }

    let original = session.duplicate_of(entry.name())?;
    let content = bundle.file_content(&style_file_name(&original))?;

    Some(Reemission {
        file_name,
        name: entry.name().to_string(),
        content,
        copied_from: original,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PluginSettings;

    const CSS: &str = "body{color:red}";

    fn style_entry(name: &str) -> Entry {
        Entry::application(name, vec!["shared.css".to_string()])
    }

    fn session(enforce: bool) -> BuildSession {
        let session = BuildSession::new(PluginSettings { enforce });
        session.record_generation("first", "same source");
        session.record_generation("second", "same source");
        session
    }

    fn bundle_with(file_name: &str) -> HashMap<String, EmittedContent> {
        HashMap::from([(file_name.to_string(), EmittedContent::Text(CSS.to_string()))])
    }

    #[test]
    fn test_reemits_deduplicated_style_entry() {
        let session = session(true);
        let bundle = bundle_with("first.css");

        let reemission = reconcile(&style_entry("second"), &session, &bundle).expect("reemitted");
        assert_eq!(reemission.file_name, "second.css");
        assert_eq!(reemission.name, "second");
        assert_eq!(reemission.copied_from, "first");
        assert_eq!(reemission.content, EmittedContent::Text(CSS.to_string()));
    }

    #[test]
    fn test_enforcement_off_is_a_noop() {
        let session = session(false);
        let bundle = bundle_with("first.css");
        assert_eq!(reconcile(&style_entry("second"), &session, &bundle), None);
    }

    #[test]
    fn test_existing_output_is_left_alone() {
        let session = session(true);
        let mut bundle = bundle_with("first.css");
        bundle.insert("second.css".to_string(), EmittedContent::Text(CSS.to_string()));
        assert_eq!(reconcile(&style_entry("second"), &session, &bundle), None);
    }

    #[test]
    fn test_first_producer_never_reemits() {
        let session = session(true);
        let bundle = bundle_with("second.css");
        assert_eq!(reconcile(&style_entry("first"), &session, &bundle), None);
    }

    #[test]
    fn test_missing_original_output_is_a_noop() {
        let session = session(true);
        let bundle = bundle_with("unrelated.css");
        assert_eq!(reconcile(&style_entry("second"), &session, &bundle), None);
    }

    #[test]
    fn test_non_style_entry_is_skipped() {
        let session = session(true);
        let bundle = bundle_with("first.css");
        let entry = Entry::application("second", vec!["a.css".to_string(), "b.js".to_string()]);
        assert_eq!(reconcile(&entry, &session, &bundle), None);
    }

    #[test]
    fn test_rolldown_bundle_lookup() {
        let bundle = vec![Output::Asset(Arc::new(OutputAsset {
            names: vec!["first".to_string()],
            original_file_names: vec![],
            filename: "first.css".to_string().into(),
            source: CSS.as_bytes().to_vec().into(),
        }))];

        assert!(bundle.has_file("first.css"));
        assert!(!bundle.as_slice().has_file("second.css"));
        assert_eq!(
            bundle.as_slice().file_content("first.css"),
            Some(EmittedContent::Bytes(CSS.as_bytes().to_vec()))
        );

        let session = session(true);
        let reemission =
            reconcile(&style_entry("second"), &session, bundle.as_slice()).expect("reemitted");

        let Output::Asset(asset) = reemission.into_output() else {
            panic!("expected an asset");
        };
        assert_eq!(asset.filename.as_str(), "second.css");
        assert_eq!(asset.names, vec!["second".to_string()]);
        assert!(matches!(&asset.source, StrOrBytes::Bytes(b) if b == CSS.as_bytes()));
    }
}
