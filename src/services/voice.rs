use anyhow::Result;
use thiserror::Error;

/// Failures from the speech layer, split the same way the advice layer
/// splits transport problems from content problems.
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The recognizer returned nothing usable.
    #[error("Sorry, I could not understand the audio")]
    Unrecognized,

    /// The speech service could not be reached or rejected the request.
    #[error("Speech service request failed: {0}")]
    Transport(String),
}

/// Capability trait for speech-to-text input. The advisor core only ever
/// sees the transcribed text.
#[async_trait::async_trait]
pub trait VoiceCapture: Send + Sync {
    async fn capture_spoken_text(&self) -> Result<String, VoiceError>;
}

/// Capability trait for text-to-speech output. `speak` blocks its caller
/// until the audio has finished playing.
#[async_trait::async_trait]
pub trait VoicePlayback: Send + Sync {
    async fn speak(&self, text: &str) -> Result<()>;
}
