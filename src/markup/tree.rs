use crate::markup::reader::{Token, tokenize};

/// Elements that never have content.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements that implicitly close an open `<p>`.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "div",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// Phrasing elements; a node whose element children are all inline is treated as a text leaf.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "del", "dfn", "em", "i", "ins", "kbd",
    "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var", "br",
    "wbr",
];

/// Deepest element nesting kept. Tags opened below it are dropped and their content joins the
/// innermost kept element.
const MAX_DEPTH: usize = 256;

/// One node of a parsed fragment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) children: Vec<Node>,
}

impl Element {
    fn new(tag: String, attrs: Vec<(String, String)>) -> Self {
        Self {
            tag,
            attrs,
            children: Vec::new(),
        }
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_ascii_whitespace().any(|c| c == class))
    }

    pub(crate) fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub(crate) fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// `true` when at least one child element is block-level (or unknown).
    pub(crate) fn has_block_children(&self) -> bool {
        self.element_children()
            .any(|e| !INLINE_TAGS.contains(&e.tag.as_str()))
    }

    /// First descendant (document order, excluding `self`) matching `pred`.
    pub(crate) fn find(&self, pred: &impl Fn(&Element) -> bool) -> Option<&Element> {
        for child in self.element_children() {
            if pred(child) {
                return Some(child);
            }
            if let Some(hit) = child.find(pred) {
                return Some(hit);
            }
        }
        None
    }

    /// All descendants matching `pred`, in document order. Matches are not searched further.
    pub(crate) fn find_all<'a>(&'a self, pred: &impl Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        for child in self.element_children() {
            if pred(child) {
                out.push(child);
            } else {
                child.find_all(pred, out);
            }
        }
    }

    /// Rendered text with whitespace collapsed and `<br>` kept as a line break.
    pub(crate) fn text(&self) -> String {
        self.text_excluding(&|_| false)
    }

    /// Like [`Element::text`], but skipping every descendant subtree for which `skip` holds.
    pub(crate) fn text_excluding(&self, skip: &impl Fn(&Element) -> bool) -> String {
        let mut raw = String::new();
        collect_text(self, skip, &mut raw);
        tidy_lines(&raw)
    }
}

fn collect_text(el: &Element, skip: &impl Fn(&Element) -> bool, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(t) => push_collapsed(t, out),
            Node::Element(e) if e.is("br") => out.push('\n'),
            Node::Element(e) if skip(e) => {}
            Node::Element(e) if INLINE_TAGS.contains(&e.tag.as_str()) => collect_text(e, skip, out),
            Node::Element(e) => {
                // Block boundaries separate words even without whitespace in the source.
                push_collapsed(" ", out);
                collect_text(e, skip, out);
                push_collapsed(" ", out);
            }
        }
    }
}

fn push_collapsed(s: &str, out: &mut String) {
    let mut in_ws = out.ends_with(' ');
    for c in s.chars() {
        if c.is_whitespace() && c != '\u{a0}' {
            if !in_ws {
                out.push(' ');
                in_ws = true;
            }
        } else {
            out.push(c);
            in_ws = false;
        }
    }
}

fn tidy_lines(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').map(|l| l.trim_matches(' ')).collect();
    lines.join("\n").trim().to_owned()
}

/// Parse a markup fragment into a synthetic root element tagged `#fragment`.
///
/// Parsing never fails. Unclosed elements are closed at end of input, stray closing tags are
/// ignored, and opening a block element implicitly closes an open `<p>`. Nesting is capped at
/// [`MAX_DEPTH`], so every walk over the result stays shallow.
pub(crate) fn parse_fragment(input: &str) -> Element {
    let mut stack: Vec<Element> = vec![Element::new("#fragment".to_owned(), Vec::new())];
    // Tags opened past the depth cap, still awaiting their close tag.
    let mut flattened: Vec<String> = Vec::new();

    for tok in tokenize(input) {
        let depth = stack.len();
        match tok {
            Token::Text(t) => push_node(&mut stack, Node::Text(t)),
            Token::Open {
                tag,
                attrs,
                self_closing,
            } => {
                if BLOCK_TAGS.contains(&tag.as_str()) && stack.last().is_some_and(|e| e.is("p")) {
                    close_top(&mut stack);
                }
                if tag == "li" {
                    close_open(&mut stack, "li", &["ul", "ol"]);
                }

                let el = Element::new(tag, attrs);
                if self_closing || VOID_TAGS.contains(&el.tag.as_str()) {
                    push_node(&mut stack, Node::Element(el));
                } else if stack.len() > MAX_DEPTH {
                    flattened.push(el.tag);
                } else {
                    stack.push(el);
                }
            }
            Token::Close { tag } => match flattened.iter().rposition(|t| *t == tag) {
                Some(pos) => flattened.truncate(pos),
                None => close_open(&mut stack, &tag, &[]),
            },
        }
        if stack.len() < depth {
            flattened.clear();
        }
    }

    while stack.len() > 1 {
        close_top(&mut stack);
    }
    stack.pop().unwrap_or_else(|| Element::new("#fragment".to_owned(), Vec::new()))
}

fn push_node(stack: &mut [Element], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

fn close_top(stack: &mut Vec<Element>) {
    if stack.len() <= 1 {
        return;
    }
    if let Some(el) = stack.pop() {
        push_node(stack, Node::Element(el));
    }
}

/// Close the nearest open `tag`, unless a `barrier` element sits above it.
fn close_open(stack: &mut Vec<Element>, tag: &str, barriers: &[&str]) {
    let mut depth = None;
    for (i, el) in stack.iter().enumerate().skip(1).rev() {
        if el.is(tag) {
            depth = Some(i);
            break;
        }
        if barriers.contains(&el.tag.as_str()) {
            return;
        }
    }
    let Some(depth) = depth else { return };
    while stack.len() > depth {
        close_top(stack);
    }
}
