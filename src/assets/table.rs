use crate::scene::config::SceneCraftConfig;
use crate::scene::element::{ElementKind, SceneElement};
use std::collections::{BTreeSet, HashMap};

/// Synchronous name -> playable reference lookup.
///
/// A miss is not an error: the caller stays silent (audio) or shows nothing (images).
pub trait ReferenceResolver {
    /// Resolve an authored name into something the host can play or display.
    fn resolve(&self, name: &str) -> Option<String>;
}

impl<F> ReferenceResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Pre-resolved lookup table for one scene open.
///
/// Resolution may be slow (it may touch storage or the network), so it happens once, before the
/// scene opens; playback only reads this table. Build a fresh table on every open.
#[derive(Debug, Clone, Default)]
pub struct AssetTable {
    entries: HashMap<String, String>,
    missing: BTreeSet<String>,
}

impl AssetTable {
    /// Resolve each distinct name once through `resolve`.
    pub fn from_names<'a>(
        names: impl IntoIterator<Item = &'a str>,
        resolve: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut table = Self::default();
        for name in names {
            if table.entries.contains_key(name) || table.missing.contains(name) {
                continue;
            }
            match resolve(name) {
                Some(r) => {
                    table.entries.insert(name.to_owned(), r);
                }
                None => {
                    tracing::debug!(name, "asset reference did not resolve");
                    table.missing.insert(name.to_owned());
                }
            }
        }
        table
    }

    /// Resolve every audio name the configuration and the parsed elements can play.
    pub fn prepare_audio(
        config: &SceneCraftConfig,
        elements: &[SceneElement],
        resolve: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let cues = elements.iter().filter_map(|e| match &e.kind {
            ElementKind::AudioCue { audio_ref } => Some(audio_ref.as_str()),
            _ => None,
        });
        Self::from_names(config.audio_names().chain(cues), resolve)
    }

    /// Resolve the wallpaper and every inline image.
    pub fn prepare_images(
        config: &SceneCraftConfig,
        elements: &[SceneElement],
        resolve: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let inline = elements
            .iter()
            .filter_map(|e| e.kind.image())
            .map(|i| i.src.as_str());
        Self::from_names(config.wallpaper.as_deref().into_iter().chain(inline), resolve)
    }

    /// Number of resolved names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing resolved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names that failed to resolve, sorted.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.missing.iter().map(String::as_str)
    }
}

impl ReferenceResolver for AssetTable {
    fn resolve(&self, name: &str) -> Option<String> {
        self.entries.get(name).cloned()
    }
}
