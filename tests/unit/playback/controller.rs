use super::*;
use crate::audio::backend::MemoryAudio;
use crate::audio::orchestrator::SceneSurface;
use crate::playback::scheduler::ManualScheduler;
use crate::scene::config::{ClipRef, WallpaperPosition};
use crate::scene::parse::parse_scene;
use std::collections::HashMap;

const FRAGMENT: &str = r#"
<p>Intro.</p>
<div class="dialogue"><span class="speaker">Mara:</span> Go.</div>
<p>Rain fell.</p>
<div class="sticky"><img src="map.png"><p>North.</p><p>South.</p></div>
"#;

/// Viewport-space geometry set directly by each test. Default playhead is at y = 330.
#[derive(Default)]
struct TestView {
    enter: Option<Rect>,
    exit: Option<Rect>,
    playhead: Option<Rect>,
    rects: HashMap<ElementIdx, Rect>,
    blocks: HashMap<ElementIdx, Vec<Rect>>,

    states: HashMap<ElementIdx, RevealState>,
    active_sticky: Option<ElementIdx>,
    fading: bool,
    opacity: f64,
    info: Option<String>,
}

impl TestView {
    fn in_zone() -> Self {
        Self {
            enter: Some(band(0.0, 10.0)),
            exit: Some(band(5000.0, 5010.0)),
            ..Self::default()
        }
    }

    fn place(&mut self, idx: usize, y0: f64, y1: f64) {
        self.rects.insert(ElementIdx(idx), band(y0, y1));
    }
}

fn band(y0: f64, y1: f64) -> Rect {
    Rect::new(0.0, y0, 100.0, y1)
}

impl SceneSurface for TestView {
    fn set_wallpaper(&mut self, _image: &str, _position: WallpaperPosition) {}

    fn set_wallpaper_opacity(&mut self, opacity: f64) {
        self.opacity = opacity;
    }

    fn set_info(&mut self, text: Option<&str>) {
        self.info = text.map(str::to_owned);
    }
}

impl SceneView for TestView {
    fn viewport_height(&self) -> f64 {
        1000.0
    }

    fn playhead_rect(&self) -> Option<Rect> {
        self.playhead
    }

    fn enter_marker_rect(&self) -> Option<Rect> {
        self.enter
    }

    fn exit_marker_rect(&self) -> Option<Rect> {
        self.exit
    }

    fn element_rect(&self, idx: ElementIdx) -> Option<Rect> {
        self.rects.get(&idx).copied()
    }

    fn sticky_block_rects(&self, idx: ElementIdx, out: &mut Vec<Rect>) {
        if let Some(b) = self.blocks.get(&idx) {
            out.extend_from_slice(b);
        }
    }

    fn set_element_state(&mut self, idx: ElementIdx, state: RevealState) {
        self.states.insert(idx, state);
    }

    fn set_active_sticky(&mut self, idx: Option<ElementIdx>) {
        self.active_sticky = idx;
    }

    fn set_fading(&mut self, fading: bool) {
        self.fading = fading;
    }
}

fn identity(name: &str) -> Option<String> {
    Some(name.to_owned())
}

fn config(mode: VoiceMode) -> SceneCraftConfig {
    let mut cfg = SceneCraftConfig {
        ambient: Some("wind.mp3".to_owned()),
        voice_mode: mode,
        ..SceneCraftConfig::default()
    };
    let clip = |f: &str| ClipRef {
        filename: f.to_owned(),
        volume: None,
    };
    cfg.dialogue_clips.insert(ElementIdx(1), clip("mara.mp3"));
    cfg.para_clips.insert(ElementIdx(2), clip("rain.mp3"));
    cfg.sticky_clips.insert(ElementIdx(3), clip("gulls.mp3"));
    cfg
}

/// Let the pending pre-roll fire against an empty view, leaving the controller running.
fn finish_pre_roll(
    c: &mut PlayheadController<MemoryAudio>,
    sched: &mut ManualScheduler,
    now: f64,
) {
    let fired = sched.advance(now);
    assert_eq!(fired.len(), 1);
    c.on_frame(fired[0], now, &mut TestView::default(), sched);
    assert_eq!(c.phase(), Phase::Running);
}

fn started(mode: VoiceMode) -> (PlayheadController<MemoryAudio>, MemoryAudio, ManualScheduler) {
    let audio = MemoryAudio::new();
    let mut sched = ManualScheduler::new();
    let mut c = PlayheadController::new(parse_scene(FRAGMENT), config(mode)).with_title("Harbour");
    c.start(identity, identity, audio.clone(), &mut sched);
    finish_pre_roll(&mut c, &mut sched, PRE_ROLL_SEC);
    (c, audio, sched)
}

#[test]
fn reveal_and_past_thresholds() {
    let (mut c, _, _) = started(VoiceMode::Narration);
    let mut view = TestView::in_zone();
    view.place(0, 0.0, 58.0); // center 29: past
    view.place(1, 400.0, 458.0); // center 429: revealed
    view.place(2, 402.0, 460.0); // center 431: hidden

    let report = c.tick(0.0, &mut view);
    assert_eq!(report.playhead_y, 330.0);
    assert_eq!(
        view.states[&ElementIdx(0)],
        RevealState {
            revealed: true,
            past: true
        }
    );
    assert_eq!(
        view.states[&ElementIdx(1)],
        RevealState {
            revealed: true,
            past: false
        }
    );
    assert_eq!(view.states[&ElementIdx(2)], RevealState::default());
    assert!(!view.states.contains_key(&ElementIdx(3)), "unmounted nodes are skipped");
    assert_eq!((report.revealed, report.past), (2, 1));
}

#[test]
fn playhead_marker_overrides_default_line() {
    let (mut c, _, _) = started(VoiceMode::Narration);
    let mut view = TestView::in_zone();
    view.playhead = Some(band(500.0, 501.0));
    assert_eq!(c.tick(0.0, &mut view).playhead_y, 500.0);
}

#[test]
fn zone_needs_both_markers() {
    let (mut c, audio, _) = started(VoiceMode::Narration);

    let mut view = TestView::default();
    assert!(!c.tick(0.0, &mut view).in_zone);
    view.enter = Some(band(320.0, 330.0));
    assert!(!c.tick(0.0, &mut view).in_zone, "missing exit marker");
    assert!(audio.tracks().is_empty());

    view.exit = Some(band(331.0, 340.0));
    let report = c.tick(0.0, &mut view);
    assert!(report.in_zone, "enter bottom on the playhead counts");
    assert_eq!(view.info.as_deref(), Some("Harbour"));
    assert_eq!(audio.tracks_for("wind.mp3").len(), 1);

    view.exit = Some(band(330.0, 340.0));
    assert!(!c.tick(1.0, &mut view).in_zone);
    assert_eq!(view.info, None);
    assert_eq!(view.opacity, 0.0);
}

#[test]
fn channels_follow_elements_on_the_playhead() {
    let (mut c, audio, _) = started(VoiceMode::Dialogue);
    let mut view = TestView::in_zone();
    view.place(1, 300.0, 360.0);
    view.place(2, 320.0, 340.0);
    view.blocks.insert(ElementIdx(3), vec![band(300.0, 500.0)]);

    let report = c.tick(0.0, &mut view);
    assert_eq!(report.dialogue, Some(ElementIdx(1)));
    assert_eq!(report.paragraph, Some(ElementIdx(2)));
    assert_eq!(report.sticky, Some(ElementIdx(3)));
    assert_eq!(view.active_sticky, Some(ElementIdx(3)));
    assert!(report.fading);
    assert!(view.fading);
    for src in ["wind.mp3", "mara.mp3", "rain.mp3", "gulls.mp3"] {
        assert_eq!(audio.tracks_for(src).len(), 1, "{src}");
    }

    // Everything scrolls above the playhead.
    view.rects.clear();
    view.blocks.clear();
    let report = c.tick(0.25, &mut view);
    assert_eq!((report.dialogue, report.paragraph, report.sticky), (None, None, None));
    c.tick(0.75, &mut view);
    assert!(!audio.tracks_for("mara.mp3")[0].playing);
    assert!(!audio.tracks_for("rain.mp3")[0].playing);
    assert!(!audio.tracks_for("gulls.mp3")[0].playing);
}

#[test]
fn unrevealed_sticky_block_does_not_activate() {
    let (mut c, audio, _) = started(VoiceMode::Narration);
    let mut view = TestView::in_zone();
    // Straddles the playhead but its center (530) is not revealed yet.
    view.blocks.insert(ElementIdx(3), vec![band(300.0, 760.0)]);
    assert_eq!(c.tick(0.0, &mut view).sticky, None);
    assert!(audio.tracks_for("gulls.mp3").is_empty());
}

#[test]
fn narration_mode_ignores_dialogue_clips() {
    let (mut c, audio, _) = started(VoiceMode::Narration);
    let mut view = TestView::in_zone();
    view.place(1, 300.0, 360.0);
    let report = c.tick(0.0, &mut view);
    assert_eq!(report.dialogue, Some(ElementIdx(1)));
    assert!(audio.tracks_for("mara.mp3").is_empty());
}

#[test]
fn clips_stay_silent_outside_the_zone() {
    let (mut c, audio, _) = started(VoiceMode::Dialogue);
    let mut view = TestView::default();
    view.place(1, 300.0, 360.0);
    view.place(2, 320.0, 340.0);
    let report = c.tick(0.0, &mut view);
    assert!(!report.in_zone);
    assert_eq!(report.paragraph, Some(ElementIdx(2)));
    assert!(audio.tracks().is_empty());
}

#[test]
fn lifecycle_pre_roll_then_running_then_closed() {
    let audio = MemoryAudio::new();
    let mut sched = ManualScheduler::new();
    let mut view = TestView::in_zone();
    let mut c: PlayheadController<MemoryAudio> =
        PlayheadController::new(parse_scene(FRAGMENT), config(VoiceMode::Narration));
    assert_eq!(c.phase(), Phase::Closed);
    assert_eq!(c.tick(0.0, &mut view), FrameReport {
        playhead_y: 330.0,
        ..FrameReport::default()
    });

    c.start(identity, identity, audio.clone(), &mut sched);
    assert_eq!(c.phase(), Phase::Opening);
    assert!(sched.advance(PRE_ROLL_SEC / 2.0).is_empty());
    let early = c.tick(PRE_ROLL_SEC / 2.0, &mut view);
    assert!(!early.in_zone, "ticking during pre-roll does not enter the zone");
    assert_eq!(view.info, None);
    assert!(audio.tracks().is_empty(), "nothing plays during pre-roll");
    assert_eq!(c.phase(), Phase::Opening);

    let fired = sched.advance(PRE_ROLL_SEC);
    assert_eq!(fired.len(), 1);
    let report = c.on_frame(fired[0], PRE_ROLL_SEC, &mut view, &mut sched);
    assert!(report.is_some_and(|r| r.in_zone));
    assert_eq!(c.phase(), Phase::Running);
    assert_eq!(sched.pending(), 1);

    assert_eq!(c.on_frame(fired[0], 0.2, &mut view, &mut sched), None, "stale request");

    c.stop(&mut sched);
    assert_eq!(c.phase(), Phase::Closed);
    assert_eq!(sched.pending(), 0);
    assert!(c.orchestrator().is_none());
    assert!(audio.playing().is_empty());
    assert!(audio.tracks().iter().all(|t| t.released));
}

#[test]
fn stop_mid_fade_silences_immediately() {
    let (mut c, audio, mut sched) = started(VoiceMode::Dialogue);
    let mut view = TestView::in_zone();
    view.place(1, 300.0, 360.0);
    for r in sched.advance(PRE_ROLL_SEC) {
        c.on_frame(r, PRE_ROLL_SEC, &mut view, &mut sched);
    }
    assert!(c.orchestrator().is_some_and(|o| o.has_pending_fades()));
    c.stop(&mut sched);
    assert!(audio.playing().is_empty());
    assert!(sched.advance(10.0).is_empty());
}

#[test]
fn restart_uses_a_fresh_orchestrator() {
    let (mut c, first, mut sched) = started(VoiceMode::Dialogue);
    let mut view = TestView::in_zone();
    view.place(1, 300.0, 360.0);
    c.tick(PRE_ROLL_SEC, &mut view);
    assert_eq!(first.tracks_for("mara.mp3").len(), 1);

    let second = MemoryAudio::new();
    c.start(identity, identity, second.clone(), &mut sched);
    assert!(first.playing().is_empty(), "previous open is silenced");
    assert_eq!(sched.pending(), 1, "only the new pre-roll is pending");
    let orch = c.orchestrator().unwrap();
    assert!(!orch.is_entered());
    assert_eq!(orch.current(crate::audio::orchestrator::ChannelKind::Dialogue), None);

    c.tick(0.15, &mut view);
    assert!(second.tracks().is_empty(), "the new open waits for its own pre-roll");

    finish_pre_roll(&mut c, &mut sched, 1.0);
    c.tick(1.0, &mut view);
    assert_eq!(second.tracks_for("mara.mp3").len(), 1);
}
