//! Playhead-driven playback: host view and scheduler seams, the per-frame controller and a
//! synthetic stacked layout for headless runs.

pub(crate) mod controller;
pub(crate) mod layout;
pub(crate) mod scheduler;
pub(crate) mod view;
