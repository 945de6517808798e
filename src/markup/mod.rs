//! Lenient reader for chapter markup fragments.
//!
//! This is not a conforming HTML parser. It understands the subset chapter content uses (tags,
//! attributes, void elements, comments, character references) and always produces a tree.

pub(crate) mod entity;
pub(crate) mod reader;
pub(crate) mod tree;
