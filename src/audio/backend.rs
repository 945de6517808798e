use std::cell::RefCell;
use std::rc::Rc;

/// A playable audio instance owned by exactly one channel.
///
/// Implementations wrap whatever the host plays audio with. Volume is a linear gain in `[0, 1]`.
pub trait AudioHandle {
    /// Start or resume playback.
    fn play(&mut self);
    /// Pause playback.
    fn pause(&mut self);
    /// Set linear gain.
    fn set_volume(&mut self, volume: f64);
    /// Current linear gain.
    fn volume(&self) -> f64;
    /// Drop the underlying resource. Called once, after `pause`, when the handle is discarded.
    fn release(&mut self) {}
}

/// Host factory for audio handles.
pub trait AudioBackend {
    /// Handle type produced by this backend.
    type Handle: AudioHandle;

    /// Open a handle for an already-resolved playable reference.
    ///
    /// Returning `None` leaves the requesting channel silent.
    fn open(&mut self, playable: &str, looped: bool) -> Option<Self::Handle>;
}

/// Snapshot of one track opened through [`MemoryAudio`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackState {
    /// Playable reference the track was opened with.
    pub src: String,
    /// Loop flag.
    pub looped: bool,
    /// `true` between `play` and `pause`.
    pub playing: bool,
    /// Current gain.
    pub volume: f64,
    /// Highest gain ever set.
    pub peak_volume: f64,
    /// `true` once the handle has been released.
    pub released: bool,
}

/// In-memory audio backend for tests, simulations and debugging.
///
/// Every opened handle writes its state into a shared log, so a test can inspect what the engine
/// did after handing the backend over. Single-threaded by construction.
#[derive(Debug, Clone, Default)]
pub struct MemoryAudio {
    tracks: Rc<RefCell<Vec<TrackState>>>,
}

impl MemoryAudio {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every track opened so far, in opening order.
    pub fn tracks(&self) -> Vec<TrackState> {
        self.tracks.borrow().clone()
    }

    /// Snapshot of every track opened for `src`.
    pub fn tracks_for(&self, src: &str) -> Vec<TrackState> {
        self.tracks
            .borrow()
            .iter()
            .filter(|t| t.src == src)
            .cloned()
            .collect()
    }

    /// Tracks currently playing.
    pub fn playing(&self) -> Vec<TrackState> {
        self.tracks
            .borrow()
            .iter()
            .filter(|t| t.playing)
            .cloned()
            .collect()
    }
}

/// Handle produced by [`MemoryAudio`].
#[derive(Debug)]
pub struct MemoryHandle {
    slot: usize,
    tracks: Rc<RefCell<Vec<TrackState>>>,
}

impl MemoryHandle {
    fn with<R>(&self, f: impl FnOnce(&mut TrackState) -> R) -> R {
        f(&mut self.tracks.borrow_mut()[self.slot])
    }
}

impl AudioHandle for MemoryHandle {
    fn play(&mut self) {
        self.with(|t| t.playing = true);
    }

    fn pause(&mut self) {
        self.with(|t| t.playing = false);
    }

    fn set_volume(&mut self, volume: f64) {
        self.with(|t| {
            t.volume = volume;
            t.peak_volume = t.peak_volume.max(volume);
        });
    }

    fn volume(&self) -> f64 {
        self.with(|t| t.volume)
    }

    fn release(&mut self) {
        self.with(|t| t.released = true);
    }
}

impl AudioBackend for MemoryAudio {
    type Handle = MemoryHandle;

    fn open(&mut self, playable: &str, looped: bool) -> Option<MemoryHandle> {
        let mut tracks = self.tracks.borrow_mut();
        tracks.push(TrackState {
            src: playable.to_owned(),
            looped,
            playing: false,
            volume: 1.0,
            peak_volume: 0.0,
            released: false,
        });
        Some(MemoryHandle {
            slot: tracks.len() - 1,
            tracks: Rc::clone(&self.tracks),
        })
    }
}
