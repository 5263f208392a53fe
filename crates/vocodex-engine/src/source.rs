//! Modulator source selection, file playback and recording.
//!
//! [`SourceManager`] lives on the audio side inside the processor. The
//! control side talks to it only through [`SourceCommand`]s, which the
//! processor drains at the start of every tick, and reads its state back
//! through the lock-free [`SourceStatus`].
//!
//! Each tick the manager consumes exactly one tick of live input, whatever
//! the selected source, so the capture queue never backs up and recording
//! keeps working while a file is the modulator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use vocodex_io::{NORMALIZE_PEAK, normalize_peak};

/// Seconds of recording space reserved up front. A take never grows past
/// it.
pub const RECORD_RESERVE_SECS: usize = 10;

/// Which signal feeds the analysis bank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ModulatorSource {
    /// Live capture input.
    #[default]
    Mic,
    /// The loaded modulator buffer.
    File,
}

impl ModulatorSource {
    fn index(self) -> u8 {
        match self {
            ModulatorSource::Mic => 0,
            ModulatorSource::File => 1,
        }
    }

    fn from_index(index: u8) -> Self {
        if index == 1 {
            ModulatorSource::File
        } else {
            ModulatorSource::Mic
        }
    }
}

/// Transport and buffer commands for the audio side.
#[derive(Debug, Clone)]
pub enum SourceCommand {
    /// Select the modulator source.
    SetSource(ModulatorSource),
    /// Start or pause file playback.
    SetFilePlaying(bool),
    /// Loop the file, or stop and rewind at its end.
    SetFileLooping(bool),
    /// Rewind file playback to the start.
    ResetFilePosition,
    /// Publish a new modulator buffer and rewind to it.
    LoadModulator(Arc<[f32]>),
    /// Publish a new carrier buffer.
    LoadCarrier(Arc<[f32]>),
    /// Begin appending live input to a fresh recording.
    StartRecording,
    /// Finish the recording and publish it as the modulator.
    StopRecording,
}

/// Snapshot of the source state as last published by the audio side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSelection {
    /// Active modulator source.
    pub source: ModulatorSource,
    /// Whether file playback is running.
    pub file_playing: bool,
    /// Whether file playback loops.
    pub file_looping: bool,
    /// Whether live input is being recorded.
    pub recording: bool,
    /// Whether a modulator buffer is loaded.
    pub modulator_loaded: bool,
    /// Playback position in samples.
    pub file_position: usize,
}

impl Default for SourceSelection {
    fn default() -> Self {
        Self {
            source: ModulatorSource::Mic,
            file_playing: false,
            file_looping: true,
            recording: false,
            modulator_loaded: false,
            file_position: 0,
        }
    }
}

/// Atomic mirror of [`SourceSelection`], written by the audio side once per
/// tick and read by anyone.
#[derive(Debug)]
pub struct SourceStatus {
    source: AtomicU8,
    file_playing: AtomicBool,
    file_looping: AtomicBool,
    recording: AtomicBool,
    modulator_loaded: AtomicBool,
    file_position: AtomicUsize,
}

impl Default for SourceStatus {
    fn default() -> Self {
        let initial = SourceSelection::default();
        Self {
            source: AtomicU8::new(initial.source.index()),
            file_playing: AtomicBool::new(initial.file_playing),
            file_looping: AtomicBool::new(initial.file_looping),
            recording: AtomicBool::new(initial.recording),
            modulator_loaded: AtomicBool::new(initial.modulator_loaded),
            file_position: AtomicUsize::new(initial.file_position),
        }
    }
}

impl SourceStatus {
    /// Read the last published state.
    pub fn load(&self) -> SourceSelection {
        SourceSelection {
            source: ModulatorSource::from_index(self.source.load(Ordering::Acquire)),
            file_playing: self.file_playing.load(Ordering::Acquire),
            file_looping: self.file_looping.load(Ordering::Acquire),
            recording: self.recording.load(Ordering::Acquire),
            modulator_loaded: self.modulator_loaded.load(Ordering::Acquire),
            file_position: self.file_position.load(Ordering::Acquire),
        }
    }

    fn store(&self, selection: &SourceSelection) {
        self.source
            .store(selection.source.index(), Ordering::Release);
        self.file_playing
            .store(selection.file_playing, Ordering::Release);
        self.file_looping
            .store(selection.file_looping, Ordering::Release);
        self.recording.store(selection.recording, Ordering::Release);
        self.modulator_loaded
            .store(selection.modulator_loaded, Ordering::Release);
        self.file_position
            .store(selection.file_position, Ordering::Release);
    }
}

/// Audio-side owner of the modulator buffer, playback cursor and recording.
#[derive(Debug)]
pub struct SourceManager {
    source: ModulatorSource,
    modulator: Option<Arc<[f32]>>,
    position: usize,
    playing: bool,
    looping: bool,
    recording: bool,
    record_buffer: Vec<f32>,
    record_reserve: usize,
    status: Arc<SourceStatus>,
}

impl SourceManager {
    /// Manager publishing into `status`. Recording reserves
    /// [`RECORD_RESERVE_SECS`] at `sample_rate`.
    pub fn new(sample_rate: u32, status: Arc<SourceStatus>) -> Self {
        let manager = Self {
            source: ModulatorSource::Mic,
            modulator: None,
            position: 0,
            playing: false,
            looping: true,
            recording: false,
            record_buffer: Vec::new(),
            record_reserve: sample_rate as usize * RECORD_RESERVE_SECS,
            status,
        };
        manager.publish();
        manager
    }

    /// Apply one command. Returns the new carrier buffer for
    /// [`SourceCommand::LoadCarrier`], which the carrier generator owns.
    pub fn apply(&mut self, command: SourceCommand) -> Option<Arc<[f32]>> {
        match command {
            SourceCommand::SetSource(source) => self.source = source,
            SourceCommand::SetFilePlaying(playing) => self.playing = playing,
            SourceCommand::SetFileLooping(looping) => self.looping = looping,
            SourceCommand::ResetFilePosition => self.position = 0,
            SourceCommand::LoadModulator(buffer) => self.load_modulator(buffer),
            SourceCommand::LoadCarrier(buffer) => return Some(buffer),
            SourceCommand::StartRecording => self.start_recording(),
            SourceCommand::StopRecording => self.stop_recording(),
        }
        None
    }

    fn load_modulator(&mut self, buffer: Arc<[f32]>) {
        self.modulator = if buffer.is_empty() { None } else { Some(buffer) };
        self.position = 0;
    }

    fn start_recording(&mut self) {
        self.record_buffer.clear();
        if self.record_buffer.capacity() < self.record_reserve {
            self.record_buffer.reserve(self.record_reserve);
        }
        self.recording = true;
    }

    fn stop_recording(&mut self) {
        if !self.recording {
            return;
        }
        self.recording = false;
        let mut take = std::mem::take(&mut self.record_buffer);
        if take.iter().all(|s| *s == 0.0) {
            return;
        }
        normalize_peak(&mut take, NORMALIZE_PEAK);
        self.modulator = Some(Arc::from(take));
        self.position = 0;
        self.source = ModulatorSource::File;
        self.playing = true;
    }

    /// Fill `out` with one tick of modulator.
    ///
    /// `live` is this tick's capture input (silence when capture is closed);
    /// it is recorded when recording and used when the mic is selected.
    /// Recording stops appending once the reserve is full. Paused or missing
    /// file playback yields silence.
    pub fn fill_modulator(&mut self, live: &[f32], out: &mut [f32]) {
        debug_assert_eq!(live.len(), out.len());
        if self.recording {
            let room = self.record_reserve.saturating_sub(self.record_buffer.len());
            self.record_buffer
                .extend_from_slice(&live[..live.len().min(room)]);
        }

        match self.source {
            ModulatorSource::Mic => out.copy_from_slice(live),
            ModulatorSource::File => self.fill_from_file(out),
        }
        self.publish();
    }

    fn fill_from_file(&mut self, out: &mut [f32]) {
        let Some(buffer) = self.modulator.as_ref().filter(|_| self.playing) else {
            out.fill(0.0);
            return;
        };

        for sample in out.iter_mut() {
            if self.position >= buffer.len() {
                if self.looping {
                    self.position = 0;
                } else {
                    self.playing = false;
                    self.position = 0;
                    *sample = 0.0;
                    continue;
                }
            }
            if self.playing {
                *sample = buffer[self.position];
                self.position += 1;
            } else {
                *sample = 0.0;
            }
        }
    }

    /// Current state.
    pub fn selection(&self) -> SourceSelection {
        SourceSelection {
            source: self.source,
            file_playing: self.playing,
            file_looping: self.looping,
            recording: self.recording,
            modulator_loaded: self.modulator.is_some(),
            file_position: self.position,
        }
    }

    /// Samples recorded so far.
    pub fn recorded_len(&self) -> usize {
        self.record_buffer.len()
    }

    /// The loaded modulator buffer.
    pub fn modulator(&self) -> Option<&Arc<[f32]>> {
        self.modulator.as_ref()
    }

    /// Write the current state to the shared [`SourceStatus`].
    pub fn publish(&self) {
        self.status.store(&self.selection());
    }
}
