//! SceneCraft turns an authored chapter into scroll-synchronized playback.
//!
//! The pieces, bottom-up:
//!
//! - [`parse_scene`] reads a chapter markup fragment into ordered [`SceneElement`]s
//! - [`Fade`] ramps one [`AudioHandle`] in or out, linearly and without clicks
//! - [`AudioOrchestrator`] owns the five audio channels of one open scene
//! - [`PlayheadController`] is the per-frame driver the host's repaint loop calls
//!
//! The host supplies geometry through [`SceneView`], repaint wake-ups through [`FrameScheduler`],
//! audio through [`AudioBackend`] and name lookup through [`ReferenceResolver`]. Nothing in the
//! per-frame path returns errors; [`SceneError`] only appears when loading configuration.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;
mod markup;

pub(crate) mod audio;
pub(crate) mod playback;
pub(crate) mod scene;

pub use crate::foundation::core::{ElementIdx, Rect};
pub use crate::foundation::error::{SceneError, SceneResult};

pub use crate::assets::table::{AssetTable, ReferenceResolver};
pub use crate::audio::backend::{AudioBackend, AudioHandle, MemoryAudio, MemoryHandle, TrackState};
pub use crate::audio::fade::{Fade, FadeState, begin_fade_out, kill_slot, tick_slot};
pub use crate::audio::orchestrator::{AudioOrchestrator, CLIP_FADE_SEC, ChannelKind, SceneSurface};
pub use crate::playback::controller::{
    FrameReport, PAST_FRACTION, PLAYHEAD_FRACTION, PRE_ROLL_SEC, Phase, PlayheadController,
    REVEAL_LEAD_PX,
};
pub use crate::playback::layout::StackedView;
pub use crate::playback::scheduler::{FrameRequest, FrameScheduler, ManualScheduler};
pub use crate::playback::view::{RevealState, SceneView};
pub use crate::scene::config::{
    ClipMap, ClipRef, SceneCraftConfig, VoiceMode, WallpaperPosition,
};
pub use crate::scene::element::{ElementKind, ImageRef, SceneElement};
pub use crate::scene::lint::{BindingIssue, ClipMapKind, lint_clip_bindings};
pub use crate::scene::parse::{SCENE_BREAK_GLYPH, parse_scene};
