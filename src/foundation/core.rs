pub use kurbo::Rect;

/// Zero-based emission index of a parsed scene element.
///
/// This is the only identifier audio clip maps may reference. It is assigned once per parse and is
/// stable for every render of the same parsed fragment.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ElementIdx(pub usize);

impl std::fmt::Display for ElementIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Vertical center of a viewport-space box.
pub(crate) fn center_y(r: Rect) -> f64 {
    (r.y0 + r.y1) * 0.5
}

/// `true` when the horizontal line at `y` crosses the box (edges inclusive).
pub(crate) fn straddles(r: Rect, y: f64) -> bool {
    r.y0 <= y && r.y1 >= y
}

/// Clamp a user-supplied gain into `[0, 1]`; non-finite values are silent.
pub(crate) fn unit_gain(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}
