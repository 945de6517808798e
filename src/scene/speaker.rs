/// Speaker label split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct SpeakerLabel {
    pub(crate) speaker: Option<String>,
    pub(crate) direction: Option<String>,
}

/// Parse a dialogue label of the form `NAME (DIRECTION):`.
///
/// Either part may be missing, but not both. Names are lower-cased. Anything that does not fit
/// the pattern becomes the speaker name verbatim (minus a trailing colon) with no direction.
pub(crate) fn parse_speaker_label(label: &str) -> SpeakerLabel {
    let label = label.trim();
    strict(label).unwrap_or_else(|| fallback(label))
}

fn strict(label: &str) -> Option<SpeakerLabel> {
    let body = label.strip_suffix(':')?.trim_end();

    let (name, direction) = match body.strip_suffix(')') {
        Some(open_part) => {
            let open = open_part.rfind('(')?;
            let direction = open_part[open + 1..].trim();
            if direction.contains(['(', ')']) {
                return None;
            }
            (open_part[..open].trim(), direction)
        }
        None => (body, ""),
    };
    if name.contains(['(', ')', ':']) {
        return None;
    }
    if name.is_empty() && direction.is_empty() {
        return None;
    }

    Some(SpeakerLabel {
        speaker: non_empty(name).map(str::to_lowercase),
        direction: non_empty(direction).map(str::to_owned),
    })
}

fn fallback(label: &str) -> SpeakerLabel {
    let name = label.strip_suffix(':').unwrap_or(label).trim();
    SpeakerLabel {
        speaker: non_empty(name).map(str::to_lowercase),
        direction: None,
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() { None } else { Some(s) }
}
