/// Sound cues: short procedural effects via rodio.
///
/// Five cues, one per sound-bearing `GameEvent`:
///   hit wall · leave wall · finish level · back level · finish all
///
/// Buffers are synthesised once at start-up and played fire-and-forget.
/// Build without the "sound" feature and the stub engine does nothing.

use crate::sim::event::GameEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_hit_wall: Arc<Vec<u8>>,
        sfx_leave_wall: Arc<Vec<u8>>,
        sfx_finish_level: Arc<Vec<u8>>,
        sfx_back_level: Arc<Vec<u8>>,
        sfx_finish_all: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_hit_wall: Arc::new(make_wav(&gen_thud())),
                sfx_leave_wall: Arc::new(make_wav(&gen_swish())),
                sfx_finish_level: Arc::new(make_wav(&gen_notes(&[659.0, 988.0], 0.07))),
                sfx_back_level: Arc::new(make_wav(&gen_notes(&[523.0, 392.0, 330.0], 0.08))),
                sfx_finish_all: Arc::new(make_wav(&gen_fanfare())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn play_hit_wall(&self) { self.play(&self.sfx_hit_wall); }
        pub fn play_leave_wall(&self) { self.play(&self.sfx_leave_wall); }
        pub fn play_finish_level(&self) { self.play(&self.sfx_finish_level); }
        pub fn play_back_level(&self) { self.play(&self.sfx_back_level); }
        pub fn play_finish_all(&self) { self.play(&self.sfx_finish_all); }
    }

    // ── Waveform generators (mono f32 samples) ──

    /// Wall hit: low thump, pitch dropping fast.
    fn gen_thud() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.09) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 180.0 - t * 120.0;
                phase += freq / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(2.0);
                (phase * TAU).sin() * env * 0.45
            })
            .collect()
    }

    /// Stroke start: filtered noise sweeping upward.
    fn gen_swish() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.08) as usize;
        let mut rng: u32 = 2024;
        let mut last = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                // One-pole low-pass that opens up as the swish rises
                let k = 0.1 + t * 0.6;
                last += (noise - last) * k;
                let env = (t * (1.0 - t) * 4.0).min(1.0);
                last * env * 0.2
            })
            .collect()
    }

    /// A run of equal-length notes with a soft octave overtone.
    fn gen_notes(notes: &[f32], note_dur: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.7);
                let wave = (t * freq * TAU).sin() * 0.75 + (t * freq * 2.0 * TAU).sin() * 0.25;
                samples.push(wave * env * 0.3);
            }
        }
        samples
    }

    /// Whole game cleared: rising arpeggio then a held chord.
    fn gen_fanfare() -> Vec<f32> {
        let mut samples = gen_notes(&[392.0, 523.0, 659.0, 784.0], 0.09);
        let chord = [523.0_f32, 659.0, 784.0];
        let n = (SAMPLE_RATE as f32 * 0.45) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - i as f32 / n as f32;
            let wave: f32 = chord.iter().map(|f| (t * f * TAU).sin()).sum::<f32>() / chord.len() as f32;
            samples.push(wave * env * 0.35);
        }
        samples
    }

    // ── WAV encoder ──

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_hit_wall(&self) {}
    pub fn play_leave_wall(&self) {}
    pub fn play_finish_level(&self) {}
    pub fn play_back_level(&self) {}
    pub fn play_finish_all(&self) {}
}

/// Fan a tick's events out to the matching cues.
pub fn play_events(engine: &SoundEngine, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::HitWall => engine.play_hit_wall(),
            GameEvent::LeaveWall => engine.play_leave_wall(),
            GameEvent::FinishLevel => engine.play_finish_level(),
            GameEvent::BackLevel => engine.play_back_level(),
            GameEvent::FinishAll => engine.play_finish_all(),
            GameEvent::LevelStarted { .. } | GameEvent::ScoreUpdated { .. } => {}
        }
    }
}
