//! Text-to-speech via the OpenAI speech API, played back locally.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::services::voice::VoicePlayback;

const SPEECH_API_URL: &str = "https://api.openai.com/v1/audio/speech";
const SPEECH_MODEL: &str = "tts-1";
const SPEECH_VOICE: &str = "alloy";

#[derive(Debug, Serialize)]
struct SpeechRequest {
    model: String,
    input: String,
    voice: String,
    response_format: String,
}

pub struct OpenAiSpeaker {
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiSpeaker {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = SpeechRequest {
            model: SPEECH_MODEL.to_string(),
            input: text.to_string(),
            voice: SPEECH_VOICE.to_string(),
            response_format: "wav".to_string(),
        };

        let response = self
            .client
            .post(SPEECH_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            log::error!("❌ Speech API error ({}): {}", status, error);
            anyhow::bail!("Speech API error ({}): {}", status, error);
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl VoicePlayback for OpenAiSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            anyhow::bail!("Cannot speak empty text");
        }

        let audio = self.synthesize(text).await?;
        log::debug!("🔊 Synthesized {} bytes of audio", audio.len());

        // The temp file must disappear on every exit path; the guard moves
        // into the playback task and drops there.
        let mut tmp = tempfile::Builder::new()
            .prefix("bmi-advice-")
            .suffix(".wav")
            .tempfile()
            .context("creating temp audio file")?;
        tmp.write_all(&audio).context("writing temp audio file")?;

        tokio::task::spawn_blocking(move || play_file(tmp)).await??;
        Ok(())
    }
}

/// Plays the clip to the default output device, blocking until the sink
/// drains. Takes the temp file by value so it is removed whether playback
/// finishes, the decode fails, or the device is unavailable.
fn play_file(tmp: tempfile::NamedTempFile) -> Result<()> {
    let (_stream, handle) = rodio::OutputStream::try_default()?;
    let sink = rodio::Sink::try_new(&handle)?;

    let file = std::fs::File::open(tmp.path())?;
    let source = rodio::Decoder::new(std::io::BufReader::new(file))?;
    sink.append(source);
    sink.sleep_until_end();

    Ok(())
}
