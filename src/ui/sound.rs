/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::domain::rules::Outcome;
use crate::sim::event::GameEvent;

/// Play the effect for each event, if audio is up.
pub fn play_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::EdgeBump => sfx.play_bump(),
            GameEvent::Ended { outcome: Outcome::Lost, .. } => sfx.play_crash(),
            GameEvent::Ended { outcome: Outcome::Won, .. } => sfx.play_clear(),
            GameEvent::Retried { .. } => sfx.play_retry(),
        }
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::cell::Cell;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    /// Holding the token against the border bumps every sample;
    /// don't retrigger the thud faster than this.
    const BUMP_COOLDOWN: Duration = Duration::from_millis(250);

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_bump: Arc<Vec<u8>>,
        sfx_crash: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_retry: Arc<Vec<u8>>,
        last_bump: Cell<Option<Instant>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("audio output unavailable: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_bump: Arc::new(make_wav(&gen_bump())),
                sfx_crash: Arc::new(make_wav(&gen_crash())),
                sfx_clear: Arc::new(make_wav(&gen_clear())),
                sfx_retry: Arc::new(make_wav(&gen_retry())),
                last_bump: Cell::new(None),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_bump(&self) {
            let now = Instant::now();
            if bump_due(self.last_bump.get(), now) {
                self.last_bump.set(Some(now));
                self.play(&self.sfx_bump);
            }
        }

        pub fn play_crash(&self) { self.play(&self.sfx_crash); }
        pub fn play_clear(&self) { self.play(&self.sfx_clear); }
        pub fn play_retry(&self) { self.play(&self.sfx_retry); }
    }

    fn bump_due(last: Option<Instant>, now: Instant) -> bool {
        last.map_or(true, |t| now.saturating_duration_since(t) >= BUMP_COOLDOWN)
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn tone(freq: f32, t: f32) -> f32 {
        (t * freq * 2.0 * std::f32::consts::PI).sin()
    }

    /// Border bump: very short low thud
    fn gen_bump() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.04) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                tone(110.0, t) * env * env * 0.2
            })
            .collect()
    }

    /// Wall crash: noise burst over a falling tone
    fn gen_crash() -> Vec<f32> {
        let duration = 0.45;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 24680;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let freq = 330.0 - p * 250.0; // 330Hz → 80Hz
                let t = i as f32 / SAMPLE_RATE as f32;
                // Simple LCG noise
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - p).powf(1.5);
                (tone(freq, t) * 0.5 + noise * 0.5) * env * 0.3
            })
            .collect()
    }

    /// Goal reached: ascending fanfare with a held top note
    fn gen_clear() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0, 1047.0]; // C5→E5→G5→C6
        let mut samples = Vec::new();
        for (k, &freq) in notes.iter().enumerate() {
            let dur = if k + 1 == notes.len() { 0.35 } else { 0.1 };
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.4;
                let wave = tone(freq, t) * 0.6
                    + tone(freq * 2.0, t) * 0.3
                    + tone(freq * 3.0, t) * 0.1;
                samples.push(wave * env * 0.3);
            }
        }
        // Final fade
        let fade_len = samples.len() / 5;
        let total = samples.len();
        for (i, s) in samples.iter_mut().enumerate().skip(total - fade_len) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        samples
    }

    /// Retry: two quick rising blips
    fn gen_retry() -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[660.0_f32, 990.0] {
            let n = (SAMPLE_RATE as f32 * 0.05) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                samples.push(tone(freq, t) * env * 0.25);
            }
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit PCM mono
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
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

// ── Stub when sound feature is disabled ──

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_bump(&self) {}
    pub fn play_crash(&self) {}
    pub fn play_clear(&self) {}
    pub fn play_retry(&self) {}
}
