//! Scene boundary model: configuration, parsed elements and the chapter parser.

pub(crate) mod config;
pub(crate) mod element;
pub(crate) mod lint;
pub(crate) mod parse;
pub(crate) mod speaker;
