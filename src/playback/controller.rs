use crate::assets::table::ReferenceResolver;
use crate::audio::backend::AudioBackend;
use crate::audio::orchestrator::AudioOrchestrator;
use crate::foundation::core::{ElementIdx, Rect, center_y, straddles};
use crate::playback::scheduler::{FrameRequest, FrameScheduler};
use crate::playback::view::{RevealState, SceneView};
use crate::scene::config::{SceneCraftConfig, VoiceMode};
use crate::scene::element::{ElementKind, SceneElement};

/// Delay between opening a scene and its first tick, so layout can settle.
pub const PRE_ROLL_SEC: f64 = 0.1;

/// Playhead position as a fraction of viewport height when no marker is rendered.
pub const PLAYHEAD_FRACTION: f64 = 0.33;

/// Elements reveal once their center is less than this far below the playhead.
pub const REVEAL_LEAD_PX: f64 = 100.0;

/// Elements dim once their center is this fraction of the viewport above the playhead.
pub const PAST_FRACTION: f64 = 0.3;

/// Lifecycle of one scene instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Not open; no audio, no pending request.
    #[default]
    Closed,
    /// Open and waiting out the pre-roll.
    Opening,
    /// Ticking on every repaint.
    Running,
}

/// What one tick observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Playhead y in viewport space.
    pub playhead_y: f64,
    /// Between the enter and exit markers.
    pub in_zone: bool,
    /// Rendered elements marked revealed.
    pub revealed: usize,
    /// Rendered elements marked past.
    pub past: usize,
    /// Dialogue element on the playhead.
    pub dialogue: Option<ElementIdx>,
    /// Sticky group with a revealed text block on the playhead.
    pub sticky: Option<ElementIdx>,
    /// Paragraph on the playhead.
    pub paragraph: Option<ElementIdx>,
    /// Any fade still in flight after this tick.
    pub fading: bool,
}

/// Per-frame driver of one scene: reads geometry, updates visuals and steers the audio channels.
///
/// Single-threaded and cooperative. The host owns the repaint loop through a [`FrameScheduler`] and
/// hands every fired request to [`PlayheadController::on_frame`]; [`PlayheadController::tick`] is
/// the same step without scheduling, for direct use.
pub struct PlayheadController<B: AudioBackend> {
    elements: Vec<SceneElement>,
    config: SceneCraftConfig,
    title: Option<String>,

    phase: Phase,
    pending: Option<FrameRequest>,
    orchestrator: Option<AudioOrchestrator<B>>,

    block_scratch: Vec<Rect>,
}

impl<B: AudioBackend> PlayheadController<B> {
    /// Controller for a parsed scene. Nothing plays until [`Self::start`].
    pub fn new(elements: Vec<SceneElement>, config: SceneCraftConfig) -> Self {
        Self {
            elements,
            config,
            title: None,
            phase: Phase::Closed,
            pending: None,
            orchestrator: None,
            block_scratch: Vec::new(),
        }
    }

    /// Title shown on the info line while in the scene zone.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Parsed elements this controller drives.
    pub fn elements(&self) -> &[SceneElement] {
        &self.elements
    }

    /// Orchestrator of the current open, if any.
    pub fn orchestrator(&self) -> Option<&AudioOrchestrator<B>> {
        self.orchestrator.as_ref()
    }

    /// Open the scene: build a fresh orchestrator and schedule the first tick after the pre-roll.
    ///
    /// Re-starting an open scene closes it first; nothing from the previous open is reused.
    #[tracing::instrument(skip_all, fields(elements = self.elements.len()))]
    pub fn start(
        &mut self,
        audio: impl ReferenceResolver + 'static,
        images: impl ReferenceResolver + 'static,
        backend: B,
        scheduler: &mut dyn FrameScheduler,
    ) {
        if self.phase != Phase::Closed {
            self.stop(scheduler);
        }
        self.orchestrator = Some(AudioOrchestrator::new(
            self.config.clone(),
            audio,
            images,
            backend,
        ));
        self.phase = Phase::Opening;
        self.pending = Some(scheduler.request_delay(PRE_ROLL_SEC));
        tracing::debug!("scene opening");
    }

    /// Handle a fired request: tick once and schedule the next repaint.
    ///
    /// Requests other than the one this controller is waiting on (cancelled or from an earlier open)
    /// are ignored and return `None`.
    pub fn on_frame(
        &mut self,
        request: FrameRequest,
        now_sec: f64,
        view: &mut dyn SceneView,
        scheduler: &mut dyn FrameScheduler,
    ) -> Option<FrameReport> {
        if self.pending != Some(request) {
            tracing::trace!(?request, "stale frame request ignored");
            return None;
        }
        self.pending = None;
        if self.phase == Phase::Opening {
            self.phase = Phase::Running;
            tracing::debug!("scene running");
        }
        let report = self.tick(now_sec, view);
        self.pending = Some(scheduler.request_frame());
        Some(report)
    }

    /// One synchronous step: visibility, zone transition, channel ticks, fade advance.
    ///
    /// Outside [`Phase::Running`] the controller only reports the playhead, so the pre-roll
    /// cannot be skipped by ticking early.
    pub fn tick(&mut self, now_sec: f64, view: &mut dyn SceneView) -> FrameReport {
        let vh = view.viewport_height();
        let playhead = view
            .playhead_rect()
            .map_or(vh * PLAYHEAD_FRACTION, |r| r.y0);
        let mut report = FrameReport {
            playhead_y: playhead,
            ..FrameReport::default()
        };
        if self.phase != Phase::Running {
            return report;
        }
        let Some(orch) = self.orchestrator.as_mut() else {
            return report;
        };

        for el in &self.elements {
            let Some(rect) = view.element_rect(el.idx) else {
                continue;
            };
            let state = classify(center_y(rect), playhead, vh);
            report.revealed += usize::from(state.revealed);
            report.past += usize::from(state.past);
            view.set_element_state(el.idx, state);
        }

        let entered = view.enter_marker_rect().is_some_and(|r| r.y1 <= playhead);
        let not_exited = view.exit_marker_rect().is_some_and(|r| r.y0 > playhead);
        report.in_zone = entered && not_exited;
        if report.in_zone {
            orch.enter(&mut *view, self.title.as_deref(), now_sec);
        } else {
            orch.exit(&mut *view, now_sec);
        }

        report.dialogue = self
            .elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::Dialogue { .. }))
            .find(|e| view.element_rect(e.idx).is_some_and(|r| straddles(r, playhead)))
            .map(|e| e.idx);
        report.paragraph = self
            .elements
            .iter()
            .filter(|e| matches!(e.kind, ElementKind::Paragraph))
            .find(|e| view.element_rect(e.idx).is_some_and(|r| straddles(r, playhead)))
            .map(|e| e.idx);
        report.sticky = active_sticky(&self.elements, &*view, playhead, &mut self.block_scratch);
        view.set_active_sticky(report.sticky);

        if report.in_zone {
            if self.config.voice_mode == VoiceMode::Dialogue {
                orch.tick_dialogue(report.dialogue, now_sec);
            }
            orch.tick_sticky(report.sticky, now_sec);
            orch.tick_paragraph(report.paragraph, now_sec);
        }

        orch.tick(now_sec);
        report.fading = orch.has_pending_fades();
        view.set_fading(report.fading);

        tracing::trace!(?report, "tick");
        report
    }

    /// Close the scene: cancel the pending request and silence all audio now, even mid-fade.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(request) = self.pending.take() {
            scheduler.cancel(request);
        }
        if let Some(mut orch) = self.orchestrator.take() {
            orch.cleanup();
        }
        if self.phase != Phase::Closed {
            tracing::debug!("scene closed");
        }
        self.phase = Phase::Closed;
    }
}

fn classify(center: f64, playhead: f64, viewport_height: f64) -> RevealState {
    RevealState {
        revealed: center < playhead + REVEAL_LEAD_PX,
        past: center < playhead - PAST_FRACTION * viewport_height,
    }
}

fn active_sticky(
    elements: &[SceneElement],
    view: &dyn SceneView,
    playhead: f64,
    scratch: &mut Vec<Rect>,
) -> Option<ElementIdx> {
    elements
        .iter()
        .filter(|e| matches!(e.kind, ElementKind::Sticky { .. }))
        .find(|e| {
            scratch.clear();
            view.sticky_block_rects(e.idx, scratch);
            scratch.iter().any(|&r| {
                let revealed = center_y(r) < playhead + REVEAL_LEAD_PX;
                revealed && straddles(r, playhead)
            })
        })
        .map(|e| e.idx)
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
