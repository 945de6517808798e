use crate::foundation::core::ElementIdx;
use serde::{Deserialize, Serialize};

/// One renderable unit of a chapter, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneElement {
    /// Dense emission index; the join key for per-element audio clips.
    pub idx: ElementIdx,
    /// Plain text. Sticky text may contain several paragraphs separated by a blank line.
    pub text: String,
    /// Kind-specific payload.
    #[serde(flatten)]
    pub kind: ElementKind,
}

/// Image reference carried by figures and sticky groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Image name as authored (resolved later through the image resolver).
    pub src: String,
    /// Alternative text, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Closed set of element kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ElementKind {
    /// Pinned image with text blocks scrolling past it.
    Sticky {
        /// Pinned image.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImageRef>,
        /// Caption shown with the image.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// Captioned inline image.
    Figure {
        /// Displayed image.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImageRef>,
        /// Caption text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        /// Authored display width (a CSS length such as `60%`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_width: Option<String>,
    },
    /// Spoken line.
    Dialogue {
        /// Lower-cased speaker name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speaker: Option<String>,
        /// Stage direction from the speaker label.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<String>,
    },
    /// Emphasised paragraph.
    Emphasis,
    /// Block quote.
    Quote,
    /// Character's internal thought.
    InternalThought,
    /// Scene break glyph line.
    SceneBreak,
    /// Plain paragraph.
    Paragraph,
    /// Level 1 heading.
    #[serde(rename = "heading-1")]
    Heading1,
    /// Level 2 heading.
    #[serde(rename = "heading-2")]
    Heading2,
    /// Level 3 heading.
    #[serde(rename = "heading-3")]
    Heading3,
    /// Horizontal rule.
    Divider,
    /// Explicit line break.
    LineBreak,
    /// Inline audio cue.
    AudioCue {
        /// Audio name as authored.
        audio_ref: String,
    },
}

impl ElementKind {
    /// Stable kind name, matching the serialized tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sticky { .. } => "sticky",
            Self::Figure { .. } => "figure",
            Self::Dialogue { .. } => "dialogue",
            Self::Emphasis => "emphasis",
            Self::Quote => "quote",
            Self::InternalThought => "internal-thought",
            Self::SceneBreak => "scene-break",
            Self::Paragraph => "paragraph",
            Self::Heading1 => "heading-1",
            Self::Heading2 => "heading-2",
            Self::Heading3 => "heading-3",
            Self::Divider => "divider",
            Self::LineBreak => "line-break",
            Self::AudioCue { .. } => "audio-cue",
        }
    }

    /// Structural kinds are emitted even without text.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Divider | Self::LineBreak)
    }

    /// Image carried by this kind, if any.
    pub fn image(&self) -> Option<&ImageRef> {
        match self {
            Self::Sticky { image, .. } | Self::Figure { image, .. } => image.as_ref(),
            _ => None,
        }
    }

    /// Media name carried by this kind, if any.
    pub fn media_ref(&self) -> Option<&str> {
        match self {
            Self::AudioCue { audio_ref } => Some(audio_ref),
            _ => self.image().map(|i| i.src.as_str()),
        }
    }
}

impl SceneElement {
    /// Text blocks of a sticky group (split on blank lines); the whole text for other kinds.
    pub fn text_blocks(&self) -> impl Iterator<Item = &str> {
        self.text.split("\n\n").filter(|s| !s.trim().is_empty())
    }
}
