use std::sync::Arc;

use crate::models::{AdviceFormat, BmiCategory, BmiReport, Measurement};
use crate::services::AdviceService;

/// Runs one user action end to end: validate the measurement, classify it,
/// fetch category advice through the service seam, and normalize the text
/// for display and for playback.
pub struct AdvisorHandler {
    advice: Arc<dyn AdviceService>,
    format: AdviceFormat,
}

impl AdvisorHandler {
    pub fn new(advice: Arc<dyn AdviceService>, format: AdviceFormat) -> Self {
        Self { advice, format }
    }

    /// `None` when the height is not positive; the measurement never
    /// reaches classification or the network in that case. Fetch failures
    /// are folded into the advice field as warning text here, at the
    /// boundary, so a bad request never takes the session down.
    pub async fn assess(&self, measurement: &Measurement) -> Option<BmiReport> {
        let Some(bmi) = measurement.bmi() else {
            log::warn!(
                "⚠️ Rejected measurement with non-positive height: {:?}",
                measurement
            );
            return None;
        };

        let category = BmiCategory::from_bmi(bmi);
        log::info!("📏 BMI {:.2} classified as {}", bmi, category);

        let (advice, spoken_advice) = match self.advice.fetch_advice(category.advice_prompt()).await
        {
            Ok(raw) => (
                self.format.render(&raw),
                AdviceFormat::Concise.render(&raw),
            ),
            Err(e) => {
                log::error!("❌ Advice fetch failed: {}", e);
                let warning = format!("⚠️ {}", e);
                (warning.clone(), warning)
            }
        };

        Some(BmiReport {
            bmi,
            category,
            advice,
            spoken_advice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::AdviceError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Canned advice service: records calls and prompts, replies with a
    /// fixed text or a fixed error.
    struct StubAdvice {
        reply: Result<String, AdviceError>,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl StubAdvice {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        fn failing(error: AdviceError) -> Self {
            Self {
                reply: Err(error),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait::async_trait]
    impl AdviceService for StubAdvice {
        async fn fetch_advice(&self, prompt: &str) -> Result<String, AdviceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(AdviceError::RequestFailed(msg)) => {
                    Err(AdviceError::RequestFailed(msg.clone()))
                }
                Err(AdviceError::InvalidAdvice { detail }) => Err(AdviceError::InvalidAdvice {
                    detail: detail.clone(),
                }),
                Err(AdviceError::Unexpected(msg)) => Err(AdviceError::Unexpected(msg.clone())),
            }
        }
    }

    #[tokio::test]
    async fn assess_formats_advice_for_display_and_playback() {
        let stub = Arc::new(StubAdvice::replying("Eat well\n\nSleep enough\n"));
        let handler = AdvisorHandler::new(stub.clone(), AdviceFormat::Bulleted);

        let report = handler
            .assess(&Measurement::new(70.0, 175.0))
            .await
            .unwrap();

        assert_eq!(report.category, BmiCategory::Normal);
        assert!((report.bmi - 22.86).abs() < 0.01);
        assert_eq!(report.advice, "- Eat well\n- Sleep enough");
        assert_eq!(report.spoken_advice, "Eat well | Sleep enough");
    }

    #[tokio::test]
    async fn assess_sends_the_category_prompt() {
        let stub = Arc::new(StubAdvice::replying("ok"));
        let handler = AdvisorHandler::new(stub.clone(), AdviceFormat::Raw);

        handler.assess(&Measurement::new(45.0, 175.0)).await.unwrap();

        let prompt = stub.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("gain weight"));
    }

    #[tokio::test]
    async fn fetch_errors_become_warning_text() {
        let stub = Arc::new(StubAdvice::failing(AdviceError::RequestFailed(
            "connection refused".to_string(),
        )));
        let handler = AdvisorHandler::new(stub.clone(), AdviceFormat::Bulleted);

        let report = handler
            .assess(&Measurement::new(90.0, 170.0))
            .await
            .unwrap();

        assert_eq!(report.category, BmiCategory::Overweight);
        assert!(report.advice.contains("API request failed"));
        assert!(report.advice.starts_with("⚠️"));
    }

    #[tokio::test]
    async fn invalid_payloads_become_warning_text() {
        let stub = Arc::new(StubAdvice::failing(AdviceError::InvalidAdvice {
            detail: None,
        }));
        let handler = AdvisorHandler::new(stub.clone(), AdviceFormat::Concise);

        let report = handler
            .assess(&Measurement::new(70.0, 175.0))
            .await
            .unwrap();

        assert!(report.advice.contains("Unable to fetch valid advice"));
    }

    #[tokio::test]
    async fn non_positive_height_never_reaches_the_advice_path() {
        let stub = Arc::new(StubAdvice::replying("ok"));
        let handler = AdvisorHandler::new(stub.clone(), AdviceFormat::Bulleted);

        assert!(handler.assess(&Measurement::new(70.0, 0.0)).await.is_none());
        assert!(handler.assess(&Measurement::new(70.0, -1.0)).await.is_none());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }
}
