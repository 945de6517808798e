use crate::foundation::core::ElementIdx;
use crate::scene::config::{ClipMap, SceneCraftConfig};
use crate::scene::element::{ElementKind, SceneElement};
use serde::Serialize;

/// Clip map a [`BindingIssue`] was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClipMapKind {
    /// `dialogueClips`.
    DialogueClips,
    /// `stickyClips`.
    StickyClips,
    /// `paraClips`.
    ParaClips,
}

impl ClipMapKind {
    /// Field name as written in configuration JSON.
    pub fn field(self) -> &'static str {
        match self {
            Self::DialogueClips => "dialogueClips",
            Self::StickyClips => "stickyClips",
            Self::ParaClips => "paraClips",
        }
    }

    fn accepts(self, kind: &ElementKind) -> bool {
        match self {
            Self::DialogueClips => matches!(kind, ElementKind::Dialogue { .. }),
            Self::StickyClips => matches!(kind, ElementKind::Sticky { .. }),
            Self::ParaClips => matches!(kind, ElementKind::Paragraph),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::DialogueClips => "dialogue",
            Self::StickyClips => "sticky",
            Self::ParaClips => "paragraph",
        }
    }
}

/// A clip that can never play as authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum BindingIssue {
    /// The index is past the end of the parsed element list.
    MissingElement {
        /// Offending map.
        map: ClipMapKind,
        /// Offending index.
        idx: ElementIdx,
        /// Clip filename.
        filename: String,
    },
    /// The index points at an element the channel never follows.
    WrongKind {
        /// Offending map.
        map: ClipMapKind,
        /// Offending index.
        idx: ElementIdx,
        /// Clip filename.
        filename: String,
        /// Kind the channel follows.
        expected: &'static str,
        /// Kind actually found at `idx`.
        found: &'static str,
    },
}

impl std::fmt::Display for BindingIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingElement { map, idx, filename } => write!(
                f,
                "{}[{}] ({filename}): no element with this index",
                map.field(),
                idx.0
            ),
            Self::WrongKind {
                map,
                idx,
                filename,
                expected,
                found,
            } => write!(
                f,
                "{}[{}] ({filename}): expected a {expected} element, found {found}",
                map.field(),
                idx.0
            ),
        }
    }
}

/// Check every clip binding against a parsed element list.
///
/// Indices are assigned after filtering, so editing a chapter can silently shift them; this is the
/// place to catch that. Issues come out grouped by map, in index order.
pub fn lint_clip_bindings(elements: &[SceneElement], config: &SceneCraftConfig) -> Vec<BindingIssue> {
    let mut issues = Vec::new();
    for (map, clips) in [
        (ClipMapKind::DialogueClips, &config.dialogue_clips),
        (ClipMapKind::StickyClips, &config.sticky_clips),
        (ClipMapKind::ParaClips, &config.para_clips),
    ] {
        lint_map(elements, map, clips, &mut issues);
    }
    issues
}

fn lint_map(
    elements: &[SceneElement],
    map: ClipMapKind,
    clips: &ClipMap,
    out: &mut Vec<BindingIssue>,
) {
    for (&idx, clip) in clips {
        let filename = clip.filename.clone();
        match elements.get(idx.0) {
            None => out.push(BindingIssue::MissingElement { map, idx, filename }),
            Some(el) if !map.accepts(&el.kind) => out.push(BindingIssue::WrongKind {
                map,
                idx,
                filename,
                expected: map.expected(),
                found: el.kind.name(),
            }),
            Some(_) => {}
        }
    }
}
