use crate::assets::table::ReferenceResolver;
use crate::audio::backend::{AudioBackend, AudioHandle};
use crate::audio::fade::{Fade, kill_slot, tick_slot};
use crate::foundation::core::ElementIdx;
use crate::scene::config::{ClipMap, SceneCraftConfig, VoiceMode, WallpaperPosition};

/// Ramp length for dialogue, sticky and paragraph clips.
pub const CLIP_FADE_SEC: f64 = 0.5;

/// Host target for scene-level visuals: the wallpaper layer and the info line.
pub trait SceneSurface {
    /// Show a resolved wallpaper image.
    fn set_wallpaper(&mut self, image: &str, position: WallpaperPosition);
    /// Set wallpaper opacity in `[0, 1]`.
    fn set_wallpaper_opacity(&mut self, opacity: f64);
    /// Show (or clear, with `None`) the info line.
    fn set_info(&mut self, text: Option<&str>);
}

/// The five independent audio channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Scene-wide ambient bed.
    Ambient,
    /// Scene-wide narration track.
    Narration,
    /// Clip of the dialogue line on the playhead.
    Dialogue,
    /// Clip of the sticky group on the playhead.
    Sticky,
    /// Clip of the paragraph on the playhead.
    Paragraph,
}

impl ChannelKind {
    /// All channels, in a fixed order.
    pub const ALL: [ChannelKind; 5] = [
        Self::Ambient,
        Self::Narration,
        Self::Dialogue,
        Self::Sticky,
        Self::Paragraph,
    ];
}

/// One active slot plus every clip still ramping down.
struct Channel<H: AudioHandle> {
    active: Option<Fade<H>>,
    fading: Vec<Fade<H>>,
    /// Element whose clip owns `active` (clip channels only).
    current: Option<ElementIdx>,
}

impl<H: AudioHandle> Default for Channel<H> {
    fn default() -> Self {
        Self {
            active: None,
            fading: Vec::new(),
            current: None,
        }
    }
}

impl<H: AudioHandle> Channel<H> {
    /// Start ramping the active clip down. Earlier fade-outs keep running to completion.
    fn retire(&mut self, duration_sec: f64, now_sec: f64) {
        if let Some(active) = self.active.take() {
            self.fading.push(active.fade_out(duration_sec, now_sec));
        }
    }

    fn hard_stop(&mut self) {
        kill_slot(&mut self.active);
        for fade in self.fading.drain(..) {
            fade.kill();
        }
        self.current = None;
    }

    fn tick(&mut self, now_sec: f64) {
        tick_slot(&mut self.active, now_sec);
        self.fading = std::mem::take(&mut self.fading)
            .into_iter()
            .filter_map(|fade| fade.tick(now_sec))
            .collect();
    }

    fn is_pending(&self) -> bool {
        !self.fading.is_empty() || self.active.as_ref().is_some_and(Fade::is_ramping)
    }
}

/// Owns every audio handle of one open scene and cross-fades them by scene lifecycle.
///
/// One instance per open scene; dropping it stops all audio.
pub struct AudioOrchestrator<B: AudioBackend> {
    config: SceneCraftConfig,
    audio: Box<dyn ReferenceResolver>,
    images: Box<dyn ReferenceResolver>,
    backend: B,
    entered: bool,

    ambient: Channel<B::Handle>,
    narration: Channel<B::Handle>,
    dialogue: Channel<B::Handle>,
    sticky: Channel<B::Handle>,
    paragraph: Channel<B::Handle>,
}

impl<B: AudioBackend> AudioOrchestrator<B> {
    /// Build an orchestrator from a scene configuration, the two pre-populated resolvers and the
    /// host audio backend.
    pub fn new(
        config: SceneCraftConfig,
        audio: impl ReferenceResolver + 'static,
        images: impl ReferenceResolver + 'static,
        backend: B,
    ) -> Self {
        Self {
            config,
            audio: Box::new(audio),
            images: Box::new(images),
            backend,
            entered: false,
            ambient: Channel::default(),
            narration: Channel::default(),
            dialogue: Channel::default(),
            sticky: Channel::default(),
            paragraph: Channel::default(),
        }
    }

    /// Scene configuration this orchestrator plays.
    pub fn config(&self) -> &SceneCraftConfig {
        &self.config
    }

    /// `true` between `enter` and `exit`.
    pub fn is_entered(&self) -> bool {
        self.entered
    }

    /// Element whose clip currently owns the channel, if any.
    pub fn current(&self, kind: ChannelKind) -> Option<ElementIdx> {
        self.channel(kind).current
    }

    /// `true` while the channel holds an active (non-fading-out) handle.
    pub fn is_active(&self, kind: ChannelKind) -> bool {
        self.channel(kind).active.is_some()
    }

    /// Enter the scene zone: show the wallpaper and title, fade scene-level audio in.
    ///
    /// Calling this while already entered does nothing.
    pub fn enter(&mut self, surface: &mut dyn SceneSurface, title: Option<&str>, now_sec: f64) {
        if self.entered {
            return;
        }
        self.entered = true;
        tracing::debug!(title, "scene enter");

        if let Some(name) = self.config.wallpaper.as_deref() {
            match self.images.resolve(name) {
                Some(src) => {
                    surface.set_wallpaper(&src, self.config.wallpaper_position);
                    surface.set_wallpaper_opacity(self.config.wallpaper_opacity);
                }
                None => tracing::debug!(name, "wallpaper did not resolve"),
            }
        }
        surface.set_info(title);

        let fade_in = self.config.fade_in;
        debug_assert!(self.ambient.active.is_none() && self.narration.active.is_none());
        if let Some(name) = self.config.ambient.as_deref() {
            self.ambient.active = open_fade(
                &mut self.backend,
                self.audio.as_ref(),
                name,
                self.config.ambient_volume,
                self.config.ambient_loop,
                fade_in,
                now_sec,
            );
        }
        if self.config.voice_mode == VoiceMode::Narration
            && let Some(name) = self.config.narration.as_deref()
        {
            self.narration.active = open_fade(
                &mut self.backend,
                self.audio.as_ref(),
                name,
                self.config.narration_volume,
                false,
                fade_in,
                now_sec,
            );
        }
    }

    /// Leave the scene zone: hide wallpaper and info, fade scene-level audio out and cut
    /// per-element clips.
    ///
    /// Calling this while not entered does nothing.
    pub fn exit(&mut self, surface: &mut dyn SceneSurface, now_sec: f64) {
        if !self.entered {
            return;
        }
        self.entered = false;
        tracing::debug!("scene exit");

        surface.set_wallpaper_opacity(0.0);
        surface.set_info(None);

        let fade_out = self.config.fade_out;
        self.ambient.retire(fade_out, now_sec);
        self.narration.retire(fade_out, now_sec);
        self.dialogue.hard_stop();
        self.sticky.hard_stop();
        self.paragraph.hard_stop();
    }

    /// Advance every ramp on every channel.
    pub fn tick(&mut self, now_sec: f64) {
        self.ambient.tick(now_sec);
        self.narration.tick(now_sec);
        self.dialogue.tick(now_sec);
        self.sticky.tick(now_sec);
        self.paragraph.tick(now_sec);
    }

    /// Follow the dialogue element on the playhead. Only active in [`VoiceMode::Dialogue`].
    pub fn tick_dialogue(&mut self, current: Option<ElementIdx>, now_sec: f64) {
        if self.config.voice_mode != VoiceMode::Dialogue {
            return;
        }
        self.tick_clip(ChannelKind::Dialogue, current, now_sec);
    }

    /// Follow the sticky group on the playhead.
    pub fn tick_sticky(&mut self, current: Option<ElementIdx>, now_sec: f64) {
        self.tick_clip(ChannelKind::Sticky, current, now_sec);
    }

    /// Follow the paragraph on the playhead.
    pub fn tick_paragraph(&mut self, current: Option<ElementIdx>, now_sec: f64) {
        self.tick_clip(ChannelKind::Paragraph, current, now_sec);
    }

    /// `true` while any channel is ramping in or fading out.
    pub fn has_pending_fades(&self) -> bool {
        ChannelKind::ALL
            .iter()
            .any(|&k| self.channel(k).is_pending())
    }

    /// Stop every handle immediately and forget all state. Used when the scene closes for good.
    pub fn cleanup(&mut self) {
        self.ambient.hard_stop();
        self.narration.hard_stop();
        self.dialogue.hard_stop();
        self.sticky.hard_stop();
        self.paragraph.hard_stop();
        self.entered = false;
    }

    fn tick_clip(&mut self, kind: ChannelKind, current: Option<ElementIdx>, now_sec: f64) {
        let (channel, clips, default_volume): (&mut Channel<B::Handle>, &ClipMap, f64) = match kind
        {
            ChannelKind::Dialogue => (
                &mut self.dialogue,
                &self.config.dialogue_clips,
                self.config.dialogue_volume,
            ),
            ChannelKind::Sticky => (
                &mut self.sticky,
                &self.config.sticky_clips,
                self.config.sticky_volume,
            ),
            ChannelKind::Paragraph => (
                &mut self.paragraph,
                &self.config.para_clips,
                self.config.para_volume,
            ),
            ChannelKind::Ambient | ChannelKind::Narration => return,
        };
        if channel.current == current {
            return;
        }
        tracing::debug!(channel = ?kind, from = ?channel.current, to = ?current, "clip change");
        channel.current = current;
        channel.retire(CLIP_FADE_SEC, now_sec);

        let Some(clip) = current.and_then(|idx| clips.get(&idx)) else {
            return;
        };
        channel.active = open_fade(
            &mut self.backend,
            self.audio.as_ref(),
            &clip.filename,
            clip.volume.unwrap_or(default_volume),
            false,
            CLIP_FADE_SEC,
            now_sec,
        );
    }

    fn channel(&self, kind: ChannelKind) -> &Channel<B::Handle> {
        match kind {
            ChannelKind::Ambient => &self.ambient,
            ChannelKind::Narration => &self.narration,
            ChannelKind::Dialogue => &self.dialogue,
            ChannelKind::Sticky => &self.sticky,
            ChannelKind::Paragraph => &self.paragraph,
        }
    }
}

impl<B: AudioBackend> Drop for AudioOrchestrator<B> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn open_fade<B: AudioBackend>(
    backend: &mut B,
    audio: &dyn ReferenceResolver,
    name: &str,
    volume: f64,
    looped: bool,
    duration_sec: f64,
    now_sec: f64,
) -> Option<Fade<B::Handle>> {
    let Some(playable) = audio.resolve(name) else {
        tracing::debug!(name, "audio did not resolve; channel stays silent");
        return None;
    };
    let handle = backend.open(&playable, looped)?;
    Some(Fade::fade_in(handle, volume, duration_sec, now_sec))
}

#[cfg(test)]
#[path = "../../tests/unit/audio/orchestrator.rs"]
mod tests;
