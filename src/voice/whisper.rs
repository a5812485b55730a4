//! Speech-to-text via the OpenAI Whisper API.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::services::voice::{VoiceCapture, VoiceError};
use crate::voice::recorder;

const WHISPER_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

pub struct WhisperCapture {
    api_key: String,
    client: reqwest::Client,
}

impl WhisperCapture {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl VoiceCapture for WhisperCapture {
    async fn capture_spoken_text(&self) -> Result<String, VoiceError> {
        log::info!("🎙️ Recording for {} seconds...", recorder::RECORD_SECS);

        // cpal streams aren't Send, so the whole capture runs on one
        // blocking thread.
        let samples = tokio::task::spawn_blocking(recorder::record_clip)
            .await
            .map_err(|e| VoiceError::Transport(e.to_string()))?
            .map_err(|e| VoiceError::Transport(e.to_string()))?;

        if samples.is_empty() {
            return Err(VoiceError::Unrecognized);
        }

        let wav_data =
            recorder::encode_wav(&samples).map_err(|e| VoiceError::Transport(e.to_string()))?;
        log::debug!("📤 Uploading {} bytes of audio to Whisper", wav_data.len());

        let part = Part::bytes(wav_data)
            .file_name("speech.wav")
            .mime_str("audio/wav")
            .map_err(|e| VoiceError::Transport(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("model", "whisper-1")
            .text("language", "en");

        let response = self
            .client
            .post(WHISPER_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            log::error!("❌ Whisper API error: {}", error);
            return Err(VoiceError::Transport(error));
        }

        let result: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Transport(e.to_string()))?;

        if result.text.trim().is_empty() {
            return Err(VoiceError::Unrecognized);
        }

        log::info!("🗣️ Heard: '{}'", result.text.trim());
        Ok(result.text)
    }
}
