pub mod advice;
pub mod openrouter; // OpenRouter AI service
pub mod voice; // Capability traits; implementations live in crate::voice

pub use advice::{AdviceError, AdviceService};
pub use openrouter::OpenRouterService;
pub use voice::{VoiceCapture, VoiceError, VoicePlayback};
