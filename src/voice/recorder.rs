//! Microphone capture using cpal.

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{StreamConfig, StreamError};

/// Capture settings follow Whisper's preferred input: 16 kHz mono, 16-bit.
const SAMPLE_RATE: u32 = 16_000;
const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Fixed utterance window in seconds; trailing silence is harmless to the
/// recognizer.
pub const RECORD_SECS: u64 = 5;

/// Records a clip from the default input device. Blocking; callers run it
/// on a blocking-task thread.
pub fn record_clip() -> Result<Vec<i16>> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow::anyhow!("No input device available"))?;

    let config = StreamConfig {
        channels: CHANNELS,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let samples: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = samples.clone();

    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| push_samples(&sink, data),
        log_stream_error,
        None,
    )?;

    stream.play()?;
    std::thread::sleep(Duration::from_secs(RECORD_SECS));
    drop(stream);

    let captured = samples.lock().unwrap().clone();
    Ok(captured)
}

/// Converts floating-point frames to 16-bit PCM and appends them.
fn push_samples(buffer: &Arc<Mutex<Vec<i16>>>, data: &[f32]) {
    let mut guard = buffer.lock().unwrap();
    for &sample in data {
        guard.push((sample * i16::MAX as f32) as i16);
    }
}

fn log_stream_error(error: StreamError) {
    log::error!("Audio input error: {}", error);
}

/// Encodes PCM samples as an in-memory WAV for upload.
pub fn encode_wav(samples: &[i16]) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}
