//! Audio: host handle traits, the crossfade primitive and the per-scene channel orchestrator.

pub(crate) mod backend;
pub(crate) mod fade;
pub(crate) mod orchestrator;
