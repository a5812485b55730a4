//! Voice input/output implementations ("voice" feature). The rest of the
//! crate only depends on the capability traits in `crate::services::voice`.

pub mod playback;
pub mod recorder;
pub mod whisper;

pub use playback::OpenAiSpeaker;
pub use whisper::WhisperCapture;
