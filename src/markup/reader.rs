use crate::markup::entity::decode_entities;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Open {
        tag: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close {
        tag: String,
    },
    Text(String),
}

/// Elements whose content is dropped entirely.
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "template"];

/// Split a markup fragment into tags and text runs.
///
/// The reader is lenient: anything that does not look like a tag is text, comments and
/// declarations are skipped, and an unterminated tag at end of input is discarded.
pub(crate) fn tokenize(input: &str) -> Vec<Token> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    let mut i = 0usize;
    let mut text_start = 0usize;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }

        let rest = &input[i..];
        let next = bytes.get(i + 1).copied();

        let skip_to = if rest.starts_with("<!--") {
            Some(rest.find("-->").map_or(bytes.len(), |p| i + p + 3))
        } else if matches!(next, Some(b'!') | Some(b'?')) {
            Some(rest.find('>').map_or(bytes.len(), |p| i + p + 1))
        } else {
            None
        };
        if let Some(end) = skip_to {
            flush_text(input, text_start, i, &mut out);
            i = end;
            text_start = i;
            continue;
        }

        let is_close = next == Some(b'/');
        let name_start = if is_close { i + 2 } else { i + 1 };
        if !bytes
            .get(name_start)
            .is_some_and(|b| b.is_ascii_alphabetic())
        {
            // A lone '<' is literal text.
            i += 1;
            continue;
        }

        let Some(gt) = find_tag_end(bytes, name_start) else {
            flush_text(input, text_start, i, &mut out);
            text_start = bytes.len();
            break;
        };

        flush_text(input, text_start, i, &mut out);
        let inner = &input[name_start..gt];
        i = gt + 1;
        text_start = i;

        if is_close {
            let tag = read_name(inner).0;
            out.push(Token::Close { tag });
            continue;
        }

        let (tag, after_name) = read_name(inner);
        let body = &inner[after_name..];
        let self_closing = body.trim_end().ends_with('/');
        let attrs = read_attrs(body.trim_end().trim_end_matches('/'));

        if RAW_TEXT_TAGS.contains(&tag.as_str()) && !self_closing {
            let close = format!("</{tag}");
            let lower_rest = input[i..].to_ascii_lowercase();
            i = match lower_rest.find(&close) {
                Some(p) => input[i + p..]
                    .find('>')
                    .map_or(bytes.len(), |q| i + p + q + 1),
                None => bytes.len(),
            };
            text_start = i;
            continue;
        }

        out.push(Token::Open {
            tag,
            attrs,
            self_closing,
        });
    }

    flush_text(input, text_start, bytes.len(), &mut out);
    out
}

fn flush_text(input: &str, start: usize, end: usize, out: &mut Vec<Token>) {
    if start < end {
        out.push(Token::Text(decode_entities(&input[start..end])));
    }
}

/// Find the closing '>' of a tag, honoring quoted attribute values.
fn find_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (off, &b) in bytes[from..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(from + off),
            None => {}
        }
    }
    None
}

fn read_name(s: &str) -> (String, usize) {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'))
        .unwrap_or(s.len());
    (s[..end].to_ascii_lowercase(), end)
}

fn read_attrs(s: &str) -> Vec<(String, String)> {
    let bytes = s.as_bytes();
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        let start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        if start == i {
            // Stray '=' with no name.
            i += 1;
            continue;
        }
        let name = s[start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            out.push((name, String::new()));
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = match bytes.get(i) {
            Some(&q @ (b'"' | b'\'')) => {
                let vstart = i + 1;
                let vend = bytes[vstart..]
                    .iter()
                    .position(|&b| b == q)
                    .map_or(bytes.len(), |p| vstart + p);
                i = (vend + 1).min(bytes.len());
                &s[vstart..vend]
            }
            _ => {
                let vstart = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                &s[vstart..i]
            }
        };
        out.push((name, decode_entities(value)));
    }

    out
}
