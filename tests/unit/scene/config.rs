use super::*;

#[test]
fn partial_document_fills_defaults() {
    let cfg = SceneCraftConfig::from_json(r#"{ "ambient": "wind.mp3" }"#).unwrap();
    assert_eq!(cfg.ambient.as_deref(), Some("wind.mp3"));
    assert_eq!(cfg.voice_mode, VoiceMode::Narration);
    assert!(cfg.ambient_loop);
    assert_eq!(cfg.fade_in, 2.0);
    assert!(cfg.dialogue_clips.is_empty());
}

#[test]
fn clip_maps_are_keyed_by_element_index() {
    let cfg = SceneCraftConfig::from_json(
        r#"{
            "voiceMode": "dialogue",
            "dialogueClips": { "4": { "filename": "mara1.mp3", "volume": 0.8 } },
            "paraClips": { "7": { "audio": "rain.mp3" } }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.voice_mode, VoiceMode::Dialogue);
    let clip = &cfg.dialogue_clips[&ElementIdx(4)];
    assert_eq!(clip.filename, "mara1.mp3");
    assert_eq!(clip.volume, Some(0.8));
    assert_eq!(cfg.para_clips[&ElementIdx(7)].filename, "rain.mp3");
    assert_eq!(cfg.para_clips[&ElementIdx(7)].volume, None);
}

#[test]
fn out_of_range_volume_is_rejected() {
    let err = SceneCraftConfig::from_json(r#"{ "ambientVolume": 1.5 }"#).unwrap_err();
    assert!(matches!(err, SceneError::Validation(_)));
    assert!(err.to_string().contains("ambientVolume"));

    let err = SceneCraftConfig::from_json(
        r#"{ "stickyClips": { "1": { "filename": "a.mp3", "volume": -0.1 } } }"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("stickyClips[1].volume"));
}

#[test]
fn negative_fade_is_rejected() {
    let err = SceneCraftConfig::from_json(r#"{ "fadeOut": -1 }"#).unwrap_err();
    assert!(err.to_string().contains("fadeOut"));
}

#[test]
fn empty_names_are_config_errors() {
    let err = SceneCraftConfig::from_json(r#"{ "narration": "  " }"#).unwrap_err();
    assert!(matches!(err, SceneError::Config(_)));

    let err =
        SceneCraftConfig::from_json(r#"{ "paraClips": { "0": { "filename": "" } } }"#).unwrap_err();
    assert!(matches!(err, SceneError::Config(_)));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = SceneCraftConfig::from_json("{ nope").unwrap_err();
    assert!(matches!(err, SceneError::Serde(_)));
}

#[test]
fn audio_names_cover_every_channel() {
    let mut cfg = SceneCraftConfig {
        ambient: Some("wind.mp3".to_owned()),
        narration: Some("voice.mp3".to_owned()),
        ..Default::default()
    };
    cfg.sticky_clips.insert(
        ElementIdx(2),
        ClipRef {
            filename: "gull.mp3".to_owned(),
            volume: None,
        },
    );
    let names: Vec<&str> = cfg.audio_names().collect();
    assert_eq!(names, vec!["wind.mp3", "voice.mp3", "gull.mp3"]);
}

#[test]
fn wallpaper_position_maps_to_css() {
    let cfg = SceneCraftConfig::from_json(r#"{ "wallpaperPosition": "top" }"#).unwrap();
    assert_eq!(cfg.wallpaper_position.as_css(), "top");
}
