use crate::audio::orchestrator::SceneSurface;
use crate::foundation::core::{ElementIdx, Rect};

/// Visual progression of one rendered element relative to the playhead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealState {
    /// Center is above `playhead + REVEAL_LEAD_PX`.
    pub revealed: bool,
    /// Center is above `playhead - PAST_FRACTION * viewport_height`; the host dims these.
    pub past: bool,
}

/// Host view of one open scene.
///
/// All rects are viewport-space (y grows downward) and are read fresh on every frame. `None` means
/// the node is not mounted yet.
pub trait SceneView: SceneSurface {
    /// Current viewport height.
    fn viewport_height(&self) -> f64;

    /// Box of the playhead marker, when the host renders one.
    fn playhead_rect(&self) -> Option<Rect>;

    /// Box of the scene-enter marker.
    fn enter_marker_rect(&self) -> Option<Rect>;

    /// Box of the scene-exit marker.
    fn exit_marker_rect(&self) -> Option<Rect>;

    /// Box of the node rendered for element `idx`.
    fn element_rect(&self, idx: ElementIdx) -> Option<Rect>;

    /// Append the boxes of the text blocks of sticky group `idx` to `out`.
    fn sticky_block_rects(&self, idx: ElementIdx, out: &mut Vec<Rect>);

    /// Apply the reveal/dim classes to element `idx`.
    fn set_element_state(&mut self, idx: ElementIdx, state: RevealState);

    /// Pin the image of sticky group `idx` (or unpin with `None`).
    fn set_active_sticky(&mut self, _idx: Option<ElementIdx>) {}

    /// Show or hide the "fading" indicator.
    fn set_fading(&mut self, _fading: bool) {}
}
