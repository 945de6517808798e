use super::*;

const CHAPTER: &str = r#"
<h1>Chapter One</h1>
<h2></h2>
<p>The harbour was quiet.</p>
<div class="dialogue"><span class="speaker">Mara (flat):</span> We leave at dawn.</div>
<div class="dialogue"><span class="speaker">NARRATOR:</span>
  Nobody answered.
</div>
<hr>
<figure style="width: 60%">
  <img src="harbour.jpg" alt="The harbour">
  <figcaption>Low tide</figcaption>
</figure>
<p class="scene-break"></p>
<div class="sticky">
  <img src="lighthouse.png" alt="Lighthouse">
  <p>The lamp turned.</p>
  <p></p>
  <p>And turned again.</p>
  <div class="caption">Cape light</div>
</div>
<p class="internal-thought">Why now?</p>
<p class="emphasis">Now.</p>
<blockquote><p>Tides wait for no one.</p></blockquote>
<div class="audio-cue"><audio><source src="bell.mp3"></audio><span class="label">Bell</span></div>
<br>
<section><div>Loose text in a div.</div></section>
<p>   </p>
"#;

fn kinds(els: &[SceneElement]) -> Vec<&'static str> {
    els.iter().map(|e| e.kind.name()).collect()
}

#[test]
fn full_chapter_in_document_order() {
    let els = parse_scene(CHAPTER);
    assert_eq!(
        kinds(&els),
        vec![
            "heading-1",
            "paragraph",
            "dialogue",
            "dialogue",
            "divider",
            "figure",
            "scene-break",
            "sticky",
            "internal-thought",
            "emphasis",
            "quote",
            "audio-cue",
            "line-break",
            "paragraph",
        ]
    );
}

#[test]
fn indices_are_dense_after_filtering() {
    let els = parse_scene(CHAPTER);
    for (i, el) in els.iter().enumerate() {
        assert_eq!(el.idx, ElementIdx(i));
    }
}

#[test]
fn parsing_is_idempotent() {
    assert_eq!(parse_scene(CHAPTER), parse_scene(CHAPTER));
}

#[test]
fn dialogue_speaker_and_line() {
    let els = parse_scene(CHAPTER);
    assert_eq!(els[2].text, "We leave at dawn.");
    assert_eq!(
        els[2].kind,
        ElementKind::Dialogue {
            speaker: Some("mara".to_owned()),
            direction: Some("flat".to_owned()),
        }
    );
    assert_eq!(els[3].text, "Nobody answered.");
    assert_eq!(
        els[3].kind,
        ElementKind::Dialogue {
            speaker: Some("narrator".to_owned()),
            direction: None,
        }
    );
}

#[test]
fn figure_caption_and_width() {
    let els = parse_scene(CHAPTER);
    assert_eq!(els[5].text, "Low tide");
    let ElementKind::Figure {
        image,
        caption,
        display_width,
    } = &els[5].kind
    else {
        panic!("expected figure, got {:?}", els[5].kind);
    };
    assert_eq!(image.as_ref().map(|i| i.src.as_str()), Some("harbour.jpg"));
    assert_eq!(caption.as_deref(), Some("Low tide"));
    assert_eq!(display_width.as_deref(), Some("60%"));
}

#[test]
fn figure_text_falls_back_to_alt_then_literal() {
    let els = parse_scene(r#"<figure><img src="a.png" alt="Gulls"></figure><figure><img src="b.png"></figure>"#);
    assert_eq!(els[0].text, "Gulls");
    assert_eq!(els[1].text, "Image");
}

#[test]
fn figure_width_from_img_attribute() {
    let els = parse_scene(r#"<figure><img src="a.png" width="320"></figure>"#);
    let ElementKind::Figure { display_width, .. } = &els[0].kind else {
        panic!("expected figure");
    };
    assert_eq!(display_width.as_deref(), Some("320px"));
}

#[test]
fn scene_break_gets_glyph_when_empty() {
    let els = parse_scene(CHAPTER);
    assert_eq!(els[6].text, SCENE_BREAK_GLYPH);
    let els = parse_scene(r#"<p class="scene-break">***</p>"#);
    assert_eq!(els[0].text, "***");
}

#[test]
fn sticky_joins_paragraphs_and_keeps_image_and_caption() {
    let els = parse_scene(CHAPTER);
    assert_eq!(els[7].text, "The lamp turned.\n\nAnd turned again.");
    let ElementKind::Sticky { image, caption } = &els[7].kind else {
        panic!("expected sticky");
    };
    assert_eq!(image.as_ref().map(|i| i.src.as_str()), Some("lighthouse.png"));
    assert_eq!(
        image.as_ref().and_then(|i| i.alt.as_deref()),
        Some("Lighthouse")
    );
    assert_eq!(caption.as_deref(), Some("Cape light"));
}

#[test]
fn empty_sticky_is_dropped_but_image_only_is_kept() {
    let els = parse_scene(r#"<div class="sticky"><p></p></div><div class="sticky"><img src="x.png"></div>"#);
    assert_eq!(kinds(&els), vec!["sticky"]);
    assert_eq!(els[0].text, "");
    assert_eq!(els[0].idx, ElementIdx(0));
}

#[test]
fn audio_cue_reference_and_label() {
    let els = parse_scene(CHAPTER);
    assert_eq!(els[11].text, "Bell");
    assert_eq!(
        els[11].kind,
        ElementKind::AudioCue {
            audio_ref: "bell.mp3".to_owned()
        }
    );
}

#[test]
fn audio_without_source_is_dropped() {
    let els = parse_scene(r#"<div class="audio"><span class="caption">Silence</span></div><p>after</p>"#);
    assert_eq!(kinds(&els), vec!["paragraph"]);
}

#[test]
fn containers_recurse_and_leaves_become_paragraphs() {
    let els = parse_scene(CHAPTER);
    assert_eq!(els[13].text, "Loose text in a div.");

    let els = parse_scene("<ul><li>one</li><li>two <em>too</em></li></ul><h4>Small</h4>");
    assert_eq!(kinds(&els), vec!["paragraph", "paragraph", "paragraph"]);
    assert_eq!(els[1].text, "two too");
    assert_eq!(els[2].text, "Small");
}

#[test]
fn malformed_speaker_label_falls_back() {
    let els = parse_scene(r#"<div class="dialogue"><b class="speaker">Mara (flat</b>Hm.</div>"#);
    assert_eq!(
        els[0].kind,
        ElementKind::Dialogue {
            speaker: Some("mara (flat".to_owned()),
            direction: None,
        }
    );
    assert_eq!(els[0].text, "Hm.");
}

#[test]
fn empty_and_garbage_input_yield_nothing() {
    assert!(parse_scene("").is_empty());
    assert!(parse_scene("<div><p> </p><h3></h3></div>").is_empty());
    assert!(parse_scene("<<<>>>").iter().all(|e| !e.text.is_empty()));
}

#[test]
fn pathologically_deep_nesting_still_parses() {
    for n in [2_000, 10_000, 100_000] {
        let els = parse_scene(&("<div>".repeat(n) + "<p>x</p>"));
        assert_eq!(els.len(), 1, "depth {n}");
        assert_eq!(els[0].kind, ElementKind::Paragraph);
        assert_eq!(els[0].text, "x");
    }

    let closed = "<section>".repeat(3_000) + "<h2>Deep</h2>" + &"</section>".repeat(3_000);
    let els = parse_scene(&(closed + "<p>Shallow again.</p>"));
    assert_eq!(els.last().map(|e| e.text.as_str()), Some("Shallow again."));
    assert_eq!(els.len(), 2);
}
