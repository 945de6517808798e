use crate::foundation::core::ElementIdx;
use crate::foundation::error::{SceneError, SceneResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which voice track a scene plays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceMode {
    /// One continuous narration track for the whole scene.
    #[default]
    Narration,
    /// One clip per active dialogue element.
    Dialogue,
}

/// Anchor of the wallpaper image inside the background target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallpaperPosition {
    /// Centered.
    #[default]
    Center,
    /// Anchored to the top edge.
    Top,
    /// Anchored to the bottom edge.
    Bottom,
    /// Anchored to the left edge.
    Left,
    /// Anchored to the right edge.
    Right,
}

impl WallpaperPosition {
    /// CSS `background-position` keyword for this anchor.
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Audio clip bound to one element index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRef {
    /// Audio name, resolved through the audio resolver.
    #[serde(alias = "audio")]
    pub filename: String,
    /// Clip volume; the channel default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// Clip map keyed by element index.
pub type ClipMap = BTreeMap<ElementIdx, ClipRef>;

/// Declarative playback configuration for one scene.
///
/// The engine only reads this; every field has a default so partial documents load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneCraftConfig {
    /// Wallpaper image name.
    pub wallpaper: Option<String>,
    /// Wallpaper opacity in `[0, 1]`.
    pub wallpaper_opacity: f64,
    /// Wallpaper anchor.
    pub wallpaper_position: WallpaperPosition,

    /// Ambient track name.
    pub ambient: Option<String>,
    /// Ambient volume in `[0, 1]`.
    pub ambient_volume: f64,
    /// Loop the ambient track.
    pub ambient_loop: bool,

    /// Fade-in seconds for ambient and narration on scene enter.
    pub fade_in: f64,
    /// Fade-out seconds for ambient and narration on scene exit.
    pub fade_out: f64,

    /// Narration vs. per-line dialogue voice.
    pub voice_mode: VoiceMode,
    /// Narration track name (used only in [`VoiceMode::Narration`]).
    pub narration: Option<String>,
    /// Narration volume in `[0, 1]`.
    pub narration_volume: f64,

    /// Clips per dialogue element (used only in [`VoiceMode::Dialogue`]).
    pub dialogue_clips: ClipMap,
    /// Default dialogue clip volume.
    pub dialogue_volume: f64,
    /// Clips per sticky group.
    pub sticky_clips: ClipMap,
    /// Default sticky clip volume.
    pub sticky_volume: f64,
    /// Clips per paragraph.
    pub para_clips: ClipMap,
    /// Default paragraph clip volume.
    pub para_volume: f64,
}

impl Default for SceneCraftConfig {
    fn default() -> Self {
        Self {
            wallpaper: None,
            wallpaper_opacity: 1.0,
            wallpaper_position: WallpaperPosition::Center,
            ambient: None,
            ambient_volume: 0.5,
            ambient_loop: true,
            fade_in: 2.0,
            fade_out: 2.0,
            voice_mode: VoiceMode::Narration,
            narration: None,
            narration_volume: 1.0,
            dialogue_clips: ClipMap::new(),
            dialogue_volume: 1.0,
            sticky_clips: ClipMap::new(),
            sticky_volume: 1.0,
            para_clips: ClipMap::new(),
            para_volume: 1.0,
        }
    }
}

impl SceneCraftConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(s: &str) -> SceneResult<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check ranges and references.
    pub fn validate(&self) -> SceneResult<()> {
        check_unit("wallpaperOpacity", self.wallpaper_opacity)?;
        check_unit("ambientVolume", self.ambient_volume)?;
        check_unit("narrationVolume", self.narration_volume)?;
        check_unit("dialogueVolume", self.dialogue_volume)?;
        check_unit("stickyVolume", self.sticky_volume)?;
        check_unit("paraVolume", self.para_volume)?;

        for (name, v) in [("fadeIn", self.fade_in), ("fadeOut", self.fade_out)] {
            if !v.is_finite() || v < 0.0 {
                return Err(SceneError::validation(format!(
                    "{name} must be a finite number of seconds >= 0 (got {v})"
                )));
            }
        }

        for (name, v) in [
            ("wallpaper", &self.wallpaper),
            ("ambient", &self.ambient),
            ("narration", &self.narration),
        ] {
            if v.as_deref().is_some_and(|s| s.trim().is_empty()) {
                return Err(SceneError::config(format!("{name} must not be an empty name")));
            }
        }

        for (map_name, map) in [
            ("dialogueClips", &self.dialogue_clips),
            ("stickyClips", &self.sticky_clips),
            ("paraClips", &self.para_clips),
        ] {
            for (idx, clip) in map {
                if clip.filename.trim().is_empty() {
                    return Err(SceneError::config(format!(
                        "{map_name}[{}] has an empty filename",
                        idx.0
                    )));
                }
                if let Some(v) = clip.volume {
                    check_unit(&format!("{map_name}[{}].volume", idx.0), v)?;
                }
            }
        }

        Ok(())
    }

    /// Every audio name this configuration can play.
    pub fn audio_names(&self) -> impl Iterator<Item = &str> {
        self.ambient
            .iter()
            .chain(self.narration.iter())
            .map(String::as_str)
            .chain(
                self.dialogue_clips
                    .values()
                    .chain(self.sticky_clips.values())
                    .chain(self.para_clips.values())
                    .map(|c| c.filename.as_str()),
            )
    }
}

fn check_unit(name: &str, v: f64) -> SceneResult<()> {
    if !(0.0..=1.0).contains(&v) {
        return Err(SceneError::validation(format!(
            "{name} must be within [0, 1] (got {v})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
