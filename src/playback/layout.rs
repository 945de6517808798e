use crate::audio::orchestrator::SceneSurface;
use crate::foundation::core::{ElementIdx, Rect};
use crate::playback::view::{RevealState, SceneView};
use crate::scene::config::WallpaperPosition;
use crate::scene::element::{ElementKind, SceneElement};
use std::collections::HashMap;

const WIDTH: f64 = 720.0;
const LINE_HEIGHT: f64 = 28.0;
const CHARS_PER_LINE: usize = 64;
const BLOCK_GAP: f64 = 24.0;
const MARKER_HEIGHT: f64 = 2.0;
const FIGURE_HEIGHT: f64 = 360.0;
const DIVIDER_HEIGHT: f64 = 32.0;

/// Headless [`SceneView`]: every element stacked top to bottom in one column, scrolled by hand.
///
/// Heights are estimated from text length. The enter marker sits half a viewport below the top, the
/// exit marker after the last element, and a viewport of blank space follows so the whole scene can
/// scroll past the playhead. Everything the engine writes to the view is recorded.
#[derive(Debug, Clone)]
pub struct StackedView {
    viewport_height: f64,
    scroll_y: f64,
    enter_marker: Rect,
    exit_marker: Rect,
    content_height: f64,
    rects: Vec<Rect>,
    sticky_blocks: HashMap<ElementIdx, Vec<Rect>>,

    states: Vec<RevealState>,
    active_sticky: Option<ElementIdx>,
    fading: bool,
    wallpaper: Option<(String, WallpaperPosition)>,
    wallpaper_opacity: f64,
    info: Option<String>,
}

impl StackedView {
    /// Lay out `elements` for a viewport `viewport_height` tall.
    pub fn new(elements: &[SceneElement], viewport_height: f64) -> Self {
        let mut y = viewport_height * 0.5;
        let enter_marker = Rect::new(0.0, y, WIDTH, y + MARKER_HEIGHT);
        y += MARKER_HEIGHT + BLOCK_GAP;

        let mut rects = Vec::with_capacity(elements.len());
        let mut sticky_blocks = HashMap::new();
        for el in elements {
            let top = y;
            match &el.kind {
                ElementKind::Sticky { .. } => {
                    // Each block scrolls past the pinned image on its own screenful.
                    let block_h = viewport_height * 0.6;
                    let blocks: Vec<Rect> = el
                        .text_blocks()
                        .map(|_| {
                            let r = Rect::new(0.0, y, WIDTH, y + block_h);
                            y += block_h;
                            r
                        })
                        .collect();
                    if blocks.is_empty() {
                        y += FIGURE_HEIGHT;
                    }
                    sticky_blocks.insert(el.idx, blocks);
                }
                ElementKind::Figure { .. } => y += FIGURE_HEIGHT + text_height(&el.text),
                ElementKind::Divider | ElementKind::SceneBreak | ElementKind::LineBreak => {
                    y += DIVIDER_HEIGHT;
                }
                _ => y += text_height(&el.text),
            }
            rects.push(Rect::new(0.0, top, WIDTH, y));
            y += BLOCK_GAP;
        }

        let exit_marker = Rect::new(0.0, y, WIDTH, y + MARKER_HEIGHT);
        y += MARKER_HEIGHT + viewport_height;

        Self {
            viewport_height,
            scroll_y: 0.0,
            enter_marker,
            exit_marker,
            content_height: y,
            rects,
            sticky_blocks,
            states: vec![RevealState::default(); elements.len()],
            active_sticky: None,
            fading: false,
            wallpaper: None,
            wallpaper_opacity: 0.0,
            info: None,
        }
    }

    /// Total document height.
    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    /// Largest useful scroll offset.
    pub fn max_scroll(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    /// Scroll so that document y `scroll_y` is at the top of the viewport.
    pub fn set_scroll(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y.clamp(0.0, self.max_scroll());
    }

    /// Current scroll offset.
    pub fn scroll(&self) -> f64 {
        self.scroll_y
    }

    /// Scroll offset at which document y `doc_y` sits on the default playhead.
    pub fn scroll_to_playhead(&self, doc_y: f64) -> f64 {
        doc_y - self.viewport_height * crate::playback::controller::PLAYHEAD_FRACTION
    }

    /// Document-space box of element `idx`.
    pub fn document_rect(&self, idx: ElementIdx) -> Option<Rect> {
        self.rects.get(idx.0).copied()
    }

    /// Last state written for element `idx`.
    pub fn element_state(&self, idx: ElementIdx) -> RevealState {
        self.states.get(idx.0).copied().unwrap_or_default()
    }

    /// Last sticky group pinned.
    pub fn active_sticky(&self) -> Option<ElementIdx> {
        self.active_sticky
    }

    /// Last fading indicator state.
    pub fn is_fading(&self) -> bool {
        self.fading
    }

    /// Wallpaper shown, if any.
    pub fn wallpaper(&self) -> Option<&(String, WallpaperPosition)> {
        self.wallpaper.as_ref()
    }

    /// Last wallpaper opacity.
    pub fn wallpaper_opacity(&self) -> f64 {
        self.wallpaper_opacity
    }

    /// Info line text.
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    fn to_viewport(&self, r: Rect) -> Rect {
        Rect::new(r.x0, r.y0 - self.scroll_y, r.x1, r.y1 - self.scroll_y)
    }
}

fn text_height(text: &str) -> f64 {
    let lines: usize = text
        .split('\n')
        .map(|l| l.chars().count().div_ceil(CHARS_PER_LINE).max(1))
        .sum();
    lines as f64 * LINE_HEIGHT
}

impl SceneSurface for StackedView {
    fn set_wallpaper(&mut self, image: &str, position: WallpaperPosition) {
        self.wallpaper = Some((image.to_owned(), position));
    }

    fn set_wallpaper_opacity(&mut self, opacity: f64) {
        self.wallpaper_opacity = opacity;
    }

    fn set_info(&mut self, text: Option<&str>) {
        self.info = text.map(str::to_owned);
    }
}

impl SceneView for StackedView {
    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn playhead_rect(&self) -> Option<Rect> {
        None
    }

    fn enter_marker_rect(&self) -> Option<Rect> {
        Some(self.to_viewport(self.enter_marker))
    }

    fn exit_marker_rect(&self) -> Option<Rect> {
        Some(self.to_viewport(self.exit_marker))
    }

    fn element_rect(&self, idx: ElementIdx) -> Option<Rect> {
        self.rects.get(idx.0).map(|&r| self.to_viewport(r))
    }

    fn sticky_block_rects(&self, idx: ElementIdx, out: &mut Vec<Rect>) {
        if let Some(blocks) = self.sticky_blocks.get(&idx) {
            out.extend(blocks.iter().map(|&r| self.to_viewport(r)));
        }
    }

    fn set_element_state(&mut self, idx: ElementIdx, state: RevealState) {
        if let Some(s) = self.states.get_mut(idx.0) {
            *s = state;
        }
    }

    fn set_active_sticky(&mut self, idx: Option<ElementIdx>) {
        self.active_sticky = idx;
    }

    fn set_fading(&mut self, fading: bool) {
        self.fading = fading;
    }
}
