//! Lock-free metering: VU level and an oscilloscope window.
//!
//! The audio side owns a [`MeterWriter`]; any number of [`MeterReader`]s may
//! poll from other threads. Nothing here blocks.
//!
//! The scope window is double-buffered behind a sequence counter. The writer
//! fills the back buffer and then bumps the counter, which flips front and
//! back. A reader copies the front buffer and accepts the copy only if the
//! counter did not move meanwhile, so it never returns a half-written window.

use crossbeam_channel::{Receiver, Sender, bounded, select, tick};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering, fence};
use std::thread::JoinHandle;
use std::time::Duration;

/// Oscilloscope window length in samples.
pub const SCOPE_LEN: usize = 256;

/// Default meter polling rate in Hz.
pub const METER_RATE_HZ: f32 = 60.0;

#[derive(Debug)]
struct MeterShared {
    vu: AtomicU32,
    seq: AtomicU64,
    frames: [Box<[AtomicU32]>; 2],
}

impl MeterShared {
    fn new() -> Self {
        let frame = || (0..SCOPE_LEN).map(|_| AtomicU32::new(0)).collect();
        Self {
            vu: AtomicU32::new(0.0_f32.to_bits()),
            seq: AtomicU64::new(0),
            frames: [frame(), frame()],
        }
    }
}

/// Create a connected writer and reader.
pub fn meter_pair(sample_rate: f32) -> (MeterWriter, MeterReader) {
    let shared = Arc::new(MeterShared::new());
    (
        MeterWriter::new(Arc::clone(&shared), sample_rate),
        MeterReader { shared },
    )
}

/// Audio-side half. Collects output samples and publishes a window at most
/// [`METER_RATE_HZ`] times per second of audio.
#[derive(Debug)]
pub struct MeterWriter {
    shared: Arc<MeterShared>,
    ring: [f32; SCOPE_LEN],
    write_pos: usize,
    since_publish: usize,
    publish_interval: usize,
}

impl MeterWriter {
    fn new(shared: Arc<MeterShared>, sample_rate: f32) -> Self {
        Self {
            shared,
            ring: [0.0; SCOPE_LEN],
            write_pos: 0,
            since_publish: 0,
            publish_interval: ((sample_rate / METER_RATE_HZ) as usize).max(1),
        }
    }

    /// Store the VU level.
    #[inline]
    pub fn set_vu(&self, level: f32) {
        self.shared.vu.store(level.to_bits(), Ordering::Relaxed);
    }

    /// Append output samples, publishing the window whenever enough audio
    /// has gone by.
    pub fn push(&mut self, samples: &[f32]) {
        for &s in samples {
            self.ring[self.write_pos] = s;
            self.write_pos = (self.write_pos + 1) % SCOPE_LEN;
        }
        self.since_publish += samples.len();
        if self.since_publish >= self.publish_interval {
            self.since_publish = 0;
            self.publish();
        }
    }

    fn publish(&self) {
        let seq = self.shared.seq.load(Ordering::Relaxed);
        // previous counter bump must be visible before the overwrite
        fence(Ordering::Release);
        let back = &self.shared.frames[((seq + 1) & 1) as usize];
        // oldest sample first
        for (i, slot) in back.iter().enumerate() {
            let s = self.ring[(self.write_pos + i) % SCOPE_LEN];
            slot.store(s.to_bits(), Ordering::Relaxed);
        }
        self.shared.seq.store(seq + 1, Ordering::Release);
    }

    /// Silence the VU and the window.
    pub fn clear(&mut self) {
        self.ring = [0.0; SCOPE_LEN];
        self.write_pos = 0;
        self.since_publish = 0;
        self.set_vu(0.0);
        self.publish();
    }
}

/// Control-side half. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct MeterReader {
    shared: Arc<MeterShared>,
}

impl MeterReader {
    /// Latest VU level in `[0, 1]`.
    pub fn vu_level(&self) -> f32 {
        f32::from_bits(self.shared.vu.load(Ordering::Relaxed))
    }

    /// Number of windows published so far.
    pub fn publish_count(&self) -> u64 {
        self.shared.seq.load(Ordering::Acquire)
    }

    /// Latest complete scope window, oldest sample first.
    ///
    /// Retries only if a publish overtook the copy, which at 60 windows per
    /// second practically never happens twice in a row.
    pub fn waveform(&self) -> [f32; SCOPE_LEN] {
        let mut out = [0.0; SCOPE_LEN];
        loop {
            let before = self.shared.seq.load(Ordering::Acquire);
            self.copy_frame(before, &mut out);
            fence(Ordering::Acquire);
            if self.shared.seq.load(Ordering::Relaxed) == before {
                return out;
            }
        }
    }

    fn copy_frame(&self, seq: u64, out: &mut [f32; SCOPE_LEN]) {
        let front = &self.shared.frames[(seq & 1) as usize];
        for (slot, dst) in front.iter().zip(out.iter_mut()) {
            *dst = f32::from_bits(slot.load(Ordering::Relaxed));
        }
    }
}

/// Periodic meter polling on its own thread.
///
/// Calls the callback with the VU level and scope window at a fixed rate
/// until dropped.
///
/// ```rust,no_run
/// use vocodex_engine::meter::{MeterTicker, meter_pair};
///
/// let (_writer, reader) = meter_pair(48000.0);
/// let ticker = MeterTicker::spawn(reader, 60.0, |vu, _scope| {
///     println!("{vu:.2}");
/// });
/// drop(ticker);
/// ```
#[derive(Debug)]
pub struct MeterTicker {
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl MeterTicker {
    /// Start polling `reader` at `rate_hz`.
    pub fn spawn<F>(reader: MeterReader, rate_hz: f32, mut callback: F) -> Self
    where
        F: FnMut(f32, &[f32; SCOPE_LEN]) + Send + 'static,
    {
        let (stop, stop_rx): (Sender<()>, Receiver<()>) = bounded(1);
        let period = Duration::from_secs_f32(1.0 / rate_hz.clamp(1.0, 1000.0));
        let handle = std::thread::spawn(move || {
            let ticker = tick(period);
            loop {
                select! {
                    recv(ticker) -> _ => callback(reader.vu_level(), &reader.waveform()),
                    recv(stop_rx) -> _ => break,
                }
            }
        });
        tracing::debug!(rate_hz, "meter ticker started");
        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for MeterTicker {
    fn drop(&mut self) {
        let _ = self.stop.try_send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_vu_roundtrip() {
        let (writer, reader) = meter_pair(48000.0);
        writer.set_vu(0.42);
        assert_eq!(reader.vu_level(), 0.42);
    }

    #[test]
    fn test_publish_rate() {
        let (mut writer, reader) = meter_pair(48000.0);
        // 800 samples per publish at 48 kHz / 60 Hz
        writer.push(&[0.0; 799]);
        assert_eq!(reader.publish_count(), 0);
        writer.push(&[0.0; 1]);
        assert_eq!(reader.publish_count(), 1);
    }

    #[test]
    fn test_window_is_latest_samples_in_order() {
        let (mut writer, reader) = meter_pair(48000.0);
        let ramp: Vec<f32> = (0..1000).map(|i| i as f32).collect();
        writer.push(&ramp);
        let window = reader.waveform();
        assert_eq!(window[0], 744.0);
        assert_eq!(window[SCOPE_LEN - 1], 999.0);
        assert!(window.windows(2).all(|w| w[1] == w[0] + 1.0));
    }

    #[test]
    fn test_clear() {
        let (mut writer, reader) = meter_pair(48000.0);
        writer.set_vu(1.0);
        writer.push(&[0.5; 1000]);
        writer.clear();
        assert_eq!(reader.vu_level(), 0.0);
        assert!(reader.waveform().iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_concurrent_reads_never_tear() {
        let (mut writer, reader) = meter_pair(48000.0);
        let done = Arc::new(AtomicUsize::new(0));
        let done_reader = Arc::clone(&done);
        let handle = std::thread::spawn(move || {
            while done_reader.load(Ordering::Acquire) == 0 {
                let window = reader.waveform();
                // every published window is constant
                assert!(window.iter().all(|s| *s == window[0]), "{window:?}");
            }
        });
        for i in 0..2000 {
            writer.push(&[i as f32; 800]);
        }
        done.store(1, Ordering::Release);
        handle.join().unwrap();
    }

    #[test]
    fn test_ticker_calls_back_and_stops() {
        let (writer, reader) = meter_pair(48000.0);
        writer.set_vu(0.3);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_cb = Arc::clone(&calls);
        let ticker = MeterTicker::spawn(reader, 200.0, move |vu, _| {
            assert_eq!(vu, 0.3);
            calls_cb.fetch_add(1, Ordering::Relaxed);
        });
        std::thread::sleep(Duration::from_millis(100));
        drop(ticker);
        let seen = calls.load(Ordering::Relaxed);
        assert!(seen > 0);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(calls.load(Ordering::Relaxed), seen);
    }
}
