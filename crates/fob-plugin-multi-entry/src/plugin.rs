//! Per-entry Rolldown plugin
//!
//! One [`FobMultiEntryPlugin`] serves one entry. All plugins created by a
//! single [`multi_entry`] call share a [`BuildSession`], which is how
//! duplicate generated modules are detected across entries.
//!
//! ## Phases
//!
//! ```text
//! configure()        → register input, library entry, naming strategies
//! resolve_id()       → virtual:<name>  ⇒  \0virtual:<name>
//! load()             → synthesized import / re-export module
//! transform()        → logging only
//! generate_bundle()  → re-emit deduplicated style-only outputs (enforce)
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use rolldown_common::ModuleType;
use rolldown_plugin::{
    HookGenerateBundleArgs, HookLoadArgs, HookLoadOutput, HookLoadReturn, HookNoopReturn,
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, HookTransformArgs,
    HookTransformReturn, HookUsage, Plugin, PluginContext, SharedTransformPluginContext,
};
use tracing::{debug, info, trace};

use crate::build_config::{BuildConfig, LibraryName};
use crate::entry::{Entry, EntryKind};
use crate::naming::{AssetInfo, ChunkInfo};
use crate::options::{MultiEntryOptions, PluginSettings};
use crate::reconcile::{BundleLookup, Reemission, reconcile};
use crate::session::BuildSession;
use crate::virtual_module::{VirtualId, synthesize};

/// Create one plugin per configured entry, sharing a fresh build session
///
/// # Example
///
/// ```rust
/// use fob_plugin_multi_entry::{BuildConfig, MultiEntryOptions, PluginSettings, multi_entry};
///
/// let options = MultiEntryOptions::applications([
///     ("styles", vec!["src/reset.css".to_string(), "src/theme.css".to_string()]),
/// ]);
/// let plugins = multi_entry(&options, PluginSettings::default());
///
/// let mut config = BuildConfig::new();
/// for plugin in &plugins {
///     plugin.configure(&mut config);
/// }
/// assert_eq!(config.input().unwrap()["styles"], "virtual:styles");
/// ```
pub fn multi_entry(options: &MultiEntryOptions, settings: PluginSettings) -> Vec<FobMultiEntryPlugin> {
    let session = Arc::new(BuildSession::new(settings));

    options
        .normalize()
        .into_values()
        .map(|entry| FobMultiEntryPlugin::new(entry, Arc::clone(&session)))
        .collect()
}

/// Rolldown plugin exposing one entry as a virtual module
#[derive(Debug, Clone)]
pub struct FobMultiEntryPlugin {
    entry: Arc<Entry>,
    virtual_id: VirtualId,
    session: Arc<BuildSession>,
}

impl FobMultiEntryPlugin {
    pub fn new(entry: Entry, session: Arc<BuildSession>) -> Self {
        let virtual_id = entry.virtual_id();
        Self {
            entry: Arc::new(entry),
            virtual_id,
            session,
        }
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn virtual_id(&self) -> &VirtualId {
        &self.virtual_id
    }

    pub fn session(&self) -> &Arc<BuildSession> {
        &self.session
    }

    /// Register this entry in the build configuration
    ///
    /// Only adds keys and prepends naming strategies; nothing the caller set
    /// is removed. A library name the caller already declared is kept.
    pub fn configure<'a>(&self, config: &'a mut BuildConfig) -> &'a mut BuildConfig {
        let name = self.entry.name().to_string();
        let id = self.virtual_id.as_str().to_string();

        let build = config.build_mut();
        build
            .rolldown_options_mut()
            .input
            .insert(name.clone(), id.clone());

        match self.entry.kind() {
            EntryKind::Library => {
                let lib = build.lib_mut();
                lib.entry = Some(id);
                let library_name = lib
                    .name
                    .get_or_insert_with(|| LibraryName::Plain(name.clone()))
                    .as_str()
                    .to_string();
                self.session.set_library_name(Some(library_name));

                let resolved = self.virtual_id.resolved().to_string();
                let file_name = self.entry.script_file_name();
                build
                    .rolldown_options_mut()
                    .output_mut()
                    .entry_file_names_mut()
                    .prepend_custom(move |chunk: &ChunkInfo| {
                        (chunk.facade_module_id.as_deref() == Some(resolved.as_str()))
                            .then(|| file_name.clone())
                    });
            }
            EntryKind::Application => {
                let entry = Arc::clone(&self.entry);
                build
                    .rolldown_options_mut()
                    .output_mut()
                    .asset_file_names_mut()
                    .prepend_custom(move |asset: &AssetInfo| {
                        (asset.declares(&id) && entry.is_style_only() && asset.has_source())
                            .then(|| entry.style_file_name())
                    });
            }
        }

        debug!(entry = %name, kind = %self.entry.kind(), "registered virtual entry");
        config
    }

    /// Resolved identifier when `requested` refers to this entry
    pub fn resolve(&self, requested: &str) -> Option<String> {
        self.virtual_id
            .matches(requested)
            .then(|| self.virtual_id.resolved().to_string())
    }

    /// Generated source when `resolved_id` is this entry's module
    ///
    /// Records the source in the build session so later entries with the
    /// same text are known duplicates. The returned text is never altered.
    pub fn load_source(&self, resolved_id: &str) -> Option<String> {
        if !self.virtual_id.is_resolved(resolved_id) {
            return None;
        }

        let library_name = match self.entry.kind() {
            EntryKind::Library => self.session.library_name(),
            EntryKind::Application => None,
        };
        let source = synthesize(&self.entry, library_name.as_deref());

        if let Some(original) = self.session.record_generation(self.entry.name(), &source) {
            debug!(
                entry = self.entry.name(),
                duplicate_of = %original,
                "virtual module source matches an earlier entry"
            );
        }
        trace!(entry = self.entry.name(), source = %source, "generated virtual module");

        Some(source)
    }

    /// Observe a transform of this entry's module; never changes it
    pub fn observe_transform(&self, code: &str, id: &str) {
        if self.virtual_id.is_resolved(id) {
            debug!(
                entry = self.entry.name(),
                bytes = code.len(),
                "transforming virtual module"
            );
        }
    }

    /// See [`crate::reconcile::reconcile`]
    pub fn reconcile<B>(&self, bundle: &B) -> Option<Reemission>
    where
        B: BundleLookup + ?Sized,
    {
        reconcile(&self.entry, &self.session, bundle)
    }
}

impl Plugin for FobMultiEntryPlugin {
    fn name(&self) -> Cow<'static, str> {
        "fob-multi-entry".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load | HookUsage::Transform | HookUsage::GenerateBundle
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs<'_>,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let specifier = args.specifier.to_string();
        let resolved = self.resolve(&specifier);

        async move {
            Ok(resolved.map(|id| HookResolveIdOutput {
                id: id.into(),
                ..Default::default()
            }))
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let source = self.load_source(&id);

        async move {
            Ok(source.map(|code| HookLoadOutput {
                code: code.into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }

    fn transform(
        &self,
        _ctx: SharedTransformPluginContext,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        self.observe_transform(args.code, args.id);

        async move { Ok(None) }
    }

    fn generate_bundle(
        &self,
        _ctx: &PluginContext,
        args: &mut HookGenerateBundleArgs<'_>,
    ) -> impl std::future::Future<Output = HookNoopReturn> + Send {
        if let Some(reemission) = self.reconcile(args.bundle.as_slice()) {
            info!(
                file = %reemission.file_name,
                copied_from = %reemission.copied_from,
                "re-emitting deduplicated stylesheet"
            );
            args.bundle.push(reemission.into_output());
        }

        async move { Ok(()) }
    }
}
