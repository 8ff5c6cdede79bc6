//! Virtual module identifiers and source synthesis
//!
//! Each entry is exposed to Rolldown as a module that never touches the
//! filesystem. Its unresolved form is `virtual:<name>`; the resolved form adds
//! a leading NUL byte, the Rollup/Rolldown convention for "do not resolve this
//! against disk".
//!
//! ## Generated source
//!
//! ```text
//! // Virtual multi-entry plugin for <name>
//! import "<file>";                          (application entries)
//! export * as <binding> from "<file>";      (library entries)
//! export default <libraryName>;             (library entries, when a name is configured)
//! ```

use crate::entry::{Entry, EntryKind};

/// Prefix of every unresolved virtual identifier
pub const VIRTUAL_PREFIX: &str = "virtual:";

/// Marks a resolved identifier as virtual
pub const RESOLVED_SENTINEL: char = '\0';

/// Correlation key for one entry across the resolve, load and naming phases
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualId {
    id: String,
    resolved: String,
}

impl VirtualId {
    pub fn for_entry(name: &str) -> Self {
        let id = format!("{VIRTUAL_PREFIX}{name}");
        let resolved = format!("{RESOLVED_SENTINEL}{id}");
        Self { id, resolved }
    }

    /// The unresolved `virtual:<name>` form
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// The sentinel-prefixed form handed back from `resolve_id`
    pub fn resolved(&self) -> &str {
        &self.resolved
    }

    /// Whether a requested specifier refers to this module
    ///
    /// Matches on equality or suffix only, so `virtual:ab` never claims a
    /// request for `virtual:b`.
    pub fn matches(&self, requested: &str) -> bool {
        requested == self.id || requested.ends_with(&self.id)
    }

    pub fn is_resolved(&self, id: &str) -> bool {
        id == self.resolved
    }
}

impl std::fmt::Display for VirtualId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// First line of every generated module
pub fn header(entry_name: &str) -> String {
    format!("// Virtual multi-entry plugin for {entry_name}")
}

/// Namespace binding for a library file: base name without directory or
/// extension, with everything outside `[A-Za-z0-9_]` replaced by `_`
///
/// Two files may map to the same binding. The duplicate export is left for
/// the bundler to report.
pub fn binding_name(file: &str) -> String {
    let base = file.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(file);
    let stem = match base.rfind('.') {
        Some(index) if index > 0 => &base[..index],
        _ => base,
    };

    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Build the source text of an entry's virtual module
///
/// `library_name` is only consulted for library entries.
pub fn synthesize(entry: &Entry, library_name: Option<&str>) -> String {
    let mut lines = Vec::with_capacity(entry.files().len() + 2);
    lines.push(header(entry.name()));

    for file in entry.files() {
        let line = match entry.kind() {
            EntryKind::Library => {
                format!("export * as {} from \"{}\";", binding_name(file), file)
            }
            EntryKind::Application => format!("import \"{file}\";"),
        };
        lines.push(line);
    }

    if entry.kind() == EntryKind::Library {
        if let Some(name) = library_name {
            lines.push(format!("export default {name};"));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(list: &[&str]) -> Vec<String> {
        list.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_virtual_id_forms() {
        let id = VirtualId::for_entry("styles");
        assert_eq!(id.as_str(), "virtual:styles");
        assert_eq!(id.resolved(), "\0virtual:styles");
        assert_eq!(id.to_string(), "virtual:styles");
    }

    #[test]
    fn test_matches_exact_and_suffix() {
        let id = VirtualId::for_entry("b");
        assert!(id.matches("virtual:b"));
        assert!(id.matches("/project/virtual:b"));
        assert!(id.matches("\0virtual:b"));
    }

    #[test]
    fn test_matches_rejects_prefix_collisions() {
        let id = VirtualId::for_entry("b");
        assert!(!id.matches("virtual:ab"));
        assert!(!id.matches("virtual:bc"));
        assert!(!id.matches("virtual:b.js"));
        assert!(!id.matches("b"));
    }

    #[test]
    fn test_binding_name_strips_directory_and_extension() {
        assert_eq!(binding_name("a.js"), "a");
        assert_eq!(binding_name("src/components/button.tsx"), "button");
        assert_eq!(binding_name("src\\win\\panel.js"), "panel");
    }

    #[test]
    fn test_binding_name_sanitizes() {
        assert_eq!(binding_name("date-picker.js"), "date_picker");
        assert_eq!(binding_name("a.module.js"), "a_module");
        assert_eq!(binding_name("no_extension"), "no_extension");
        assert_eq!(binding_name(".hidden"), "_hidden");
    }

    #[test]
    fn test_library_source() {
        let entry = Entry::library("components", files(&["a.js", "b.js"]));
        assert_eq!(
            synthesize(&entry, Some("Components")),
            "// Virtual multi-entry plugin for components\n\
             export * as a from \"a.js\";\n\
             export * as b from \"b.js\";\n\
             export default Components;"
        );
    }

    #[test]
    fn test_library_source_without_name() {
        let entry = Entry::library("components", files(&["a.js"]));
        assert_eq!(
            synthesize(&entry, None),
            "// Virtual multi-entry plugin for components\nexport * as a from \"a.js\";"
        );
    }

    #[test]
    fn test_application_source_ignores_library_name() {
        let entry = Entry::application("styles", files(&["s.css", "u.css"]));
        assert_eq!(
            synthesize(&entry, Some("Components")),
            "// Virtual multi-entry plugin for styles\nimport \"s.css\";\nimport \"u.css\";"
        );
    }

    #[test]
    fn test_empty_entries() {
        let app = Entry::application("nothing", Vec::new());
        assert_eq!(synthesize(&app, None), "// Virtual multi-entry plugin for nothing");

        let lib = Entry::library("only-default", Vec::new());
        assert_eq!(
            synthesize(&lib, Some("Lib")),
            "// Virtual multi-entry plugin for only-default\nexport default Lib;"
        );
    }

    #[test]
    fn test_colliding_bindings_are_kept() {
        let entry = Entry::library("dup", files(&["a/x.js", "b/x.ts"]));
        let source = synthesize(&entry, None);
        assert_eq!(source.matches("export * as x from").count(), 2);
    }
}
