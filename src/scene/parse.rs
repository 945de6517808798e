use crate::foundation::core::ElementIdx;
use crate::markup::tree::{Element, parse_fragment};
use crate::scene::element::{ElementKind, ImageRef, SceneElement};
use crate::scene::speaker::parse_speaker_label;

/// Text shown for a scene break that has no authored glyphs.
pub const SCENE_BREAK_GLYPH: &str = "• • •";

/// Text of a figure with neither caption nor alt text.
const FIGURE_FALLBACK_TEXT: &str = "Image";

/// Parse a chapter markup fragment into ordered scene elements.
///
/// Pure and deterministic: the same fragment always yields the same elements with the same
/// indices. Indices are dense and assigned after empty elements are dropped.
#[tracing::instrument(skip(fragment), fields(bytes = fragment.len()))]
pub fn parse_scene(fragment: &str) -> Vec<SceneElement> {
    let root = parse_fragment(fragment);
    let mut out = Vec::new();
    walk(&root, &mut out);
    tracing::debug!(elements = out.len(), "parsed scene fragment");
    out
}

fn walk(container: &Element, out: &mut Vec<SceneElement>) {
    for child in container.element_children() {
        visit(child, out);
    }
}

fn visit(el: &Element, out: &mut Vec<SceneElement>) {
    if el.has_class("sticky") {
        return sticky(el, out);
    }
    if el.is("figure") {
        return figure(el, out);
    }
    if el.has_class("dialogue") {
        return dialogue(el, out);
    }

    if el.has_class("emphasis") {
        return emit(out, el.text(), ElementKind::Emphasis);
    }
    if el.has_class("internal-thought") {
        return emit(out, el.text(), ElementKind::InternalThought);
    }
    if el.has_class("scene-break") {
        let text = el.text();
        let text = if text.is_empty() {
            SCENE_BREAK_GLYPH.to_owned()
        } else {
            text
        };
        return emit(out, text, ElementKind::SceneBreak);
    }

    match el.tag.as_str() {
        "h1" => return emit(out, el.text(), ElementKind::Heading1),
        "h2" => return emit(out, el.text(), ElementKind::Heading2),
        "h3" => return emit(out, el.text(), ElementKind::Heading3),
        "hr" => return emit(out, String::new(), ElementKind::Divider),
        "blockquote" => return emit(out, el.text(), ElementKind::Quote),
        "p" => return emit(out, el.text(), ElementKind::Paragraph),
        "br" => return emit(out, String::new(), ElementKind::LineBreak),
        _ => {}
    }

    if el.is("audio") || el.has_class("audio-cue") || el.has_class("audio") {
        return audio_cue(el, out);
    }

    if el.has_block_children() {
        walk(el, out);
    } else {
        emit(out, el.text(), ElementKind::Paragraph);
    }
}

fn emit(out: &mut Vec<SceneElement>, text: String, kind: ElementKind) {
    if text.trim().is_empty() && kind.media_ref().is_none() && !kind.is_structural() {
        return;
    }
    out.push(SceneElement {
        idx: ElementIdx(out.len()),
        text,
        kind,
    });
}

fn is_caption(e: &Element) -> bool {
    e.is("figcaption") || e.has_class("caption")
}

fn caption_text(el: &Element, pred: impl Fn(&Element) -> bool) -> Option<String> {
    el.find(&pred)
        .map(Element::text)
        .filter(|t| !t.is_empty())
}

fn image_of(el: &Element) -> Option<ImageRef> {
    let img = if el.is("img") {
        el
    } else {
        el.find(&|e| e.is("img"))?
    };
    let src = img.attr("src").map(str::trim).filter(|s| !s.is_empty())?;
    Some(ImageRef {
        src: src.to_owned(),
        alt: img
            .attr("alt")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned),
    })
}

fn sticky(el: &Element, out: &mut Vec<SceneElement>) {
    let mut hits = Vec::new();
    el.find_all(&|e| e.is("p") || is_caption(e), &mut hits);
    let text = hits
        .into_iter()
        .filter(|e| !is_caption(e))
        .map(Element::text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    let image = image_of(el);
    if text.is_empty() && image.is_none() {
        return;
    }
    let caption = caption_text(el, is_caption);
    emit(out, text, ElementKind::Sticky { image, caption });
}

fn figure(el: &Element, out: &mut Vec<SceneElement>) {
    let image = image_of(el);
    let caption = caption_text(el, is_caption);
    let text = caption
        .clone()
        .or_else(|| image.as_ref().and_then(|i| i.alt.clone()))
        .unwrap_or_else(|| FIGURE_FALLBACK_TEXT.to_owned());
    let display_width = display_width(el);
    emit(
        out,
        text,
        ElementKind::Figure {
            image,
            caption,
            display_width,
        },
    );
}

/// Width hint from `style="width: …"` on the figure or its image, else the image's `width`.
fn display_width(el: &Element) -> Option<String> {
    let img = el.find(&|e| e.is("img"));
    style_width(el)
        .or_else(|| img.and_then(style_width))
        .or_else(|| {
            let w = img?.attr("width")?.trim();
            if w.is_empty() {
                None
            } else if w.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
                Some(format!("{w}px"))
            } else {
                Some(w.to_owned())
            }
        })
}

fn style_width(el: &Element) -> Option<String> {
    el.attr("style")?.split(';').find_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        if !prop.trim().eq_ignore_ascii_case("width") {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_owned())
    })
}

fn dialogue(el: &Element, out: &mut Vec<SceneElement>) {
    let is_label = |e: &Element| e.has_class("speaker");
    let label = el.find(&is_label).map(|l| parse_speaker_label(&l.text()));
    let text = el.text_excluding(&is_label);
    let (speaker, direction) = label.map_or((None, None), |l| (l.speaker, l.direction));
    emit(out, text, ElementKind::Dialogue { speaker, direction });
}

fn audio_cue(el: &Element, out: &mut Vec<SceneElement>) {
    let has_src = |e: &Element| {
        (e.is("audio") || e.is("source")) && e.attr("src").is_some_and(|s| !s.trim().is_empty())
    };
    let source = if has_src(el) { Some(el) } else { el.find(&has_src) };
    let Some(audio_ref) = source.and_then(|s| s.attr("src")).map(|s| s.trim().to_owned()) else {
        tracing::debug!("audio container without a source dropped");
        return;
    };
    let text = caption_text(el, |e| is_caption(e) || e.has_class("label")).unwrap_or_default();
    emit(out, text, ElementKind::AudioCue { audio_ref });
}

#[cfg(test)]
#[path = "../../tests/unit/scene/parse.rs"]
mod tests;
