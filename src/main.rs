mod handlers;
mod models;
mod services;
#[cfg(feature = "voice")]
mod voice;

use std::env;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use dotenv::dotenv;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use handlers::AdvisorHandler;
use models::{AdviceFormat, Measurement, HEIGHT_RANGE_CM, WEIGHT_RANGE_KG};
use services::{OpenRouterService, VoiceCapture, VoicePlayback};

const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";

/// Voice channels of the session, when available.
struct VoiceIo {
    capture: Arc<dyn VoiceCapture>,
    playback: Arc<dyn VoicePlayback>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    dotenv().ok();

    log::info!("🚀 Starting BMI Health Advisor...");

    let api_key =
        env::var("OPENROUTER_API_KEY").expect("OPENROUTER_API_KEY must be set in .env file");

    let model = env::var("OPENROUTER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

    let format = match env::var("ADVICE_FORMAT") {
        Ok(name) => AdviceFormat::from_name(&name).unwrap_or_else(|| {
            log::warn!("⚠️ Unknown ADVICE_FORMAT '{}', using bulleted", name);
            AdviceFormat::Bulleted
        }),
        Err(_) => AdviceFormat::Bulleted,
    };

    let advice = Arc::new(OpenRouterService::new(api_key, model.clone()));
    log::info!("✅ OpenRouter service initialized with model: {}", model);

    let handler = AdvisorHandler::new(advice, format);
    let voice = build_voice();

    println!();
    println!("{}", "💬 BMI Health Advisor".green().bold());
    println!(
        "{}",
        "Enter your weight and height to get personalized advice.".dimmed()
    );
    if voice.is_some() {
        println!(
            "{}",
            "Type 'speak' at the weight prompt to talk instead.".dimmed()
        );
    }
    println!("{}", "Type 'quit' or press Ctrl+C to exit.".dimmed());
    println!();

    run_session(&handler, voice.as_ref()).await
}

fn build_voice() -> Option<VoiceIo> {
    #[cfg(feature = "voice")]
    {
        match env::var("OPENAI_API_KEY") {
            Ok(key) => {
                log::info!("✅ Voice services initialized (Whisper + speech)");
                return Some(VoiceIo {
                    capture: Arc::new(voice::WhisperCapture::new(key.clone())),
                    playback: Arc::new(voice::OpenAiSpeaker::new(key)),
                });
            }
            Err(_) => {
                log::warn!("⚠️ OPENAI_API_KEY not set, voice input/output disabled");
            }
        }
    }
    None
}

async fn run_session(handler: &AdvisorHandler, voice: Option<&VoiceIo>) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    loop {
        let Some((measurement, spoken)) = read_measurement(&mut editor, voice).await? else {
            break;
        };

        let Some(report) = handler.assess(&measurement).await else {
            println!("{}", "⚠️ Please enter a valid height.".yellow());
            continue;
        };

        println!();
        println!(
            "{}",
            format!("Your BMI is: {:.2}", report.bmi).green().bold()
        );
        println!("Status: {}", report.category.to_string().cyan());
        println!("{}", "💡 Chatbot Advice:".bold());
        println!("{}", report.advice);
        println!();

        if spoken {
            if let Some(voice) = voice {
                if let Err(e) = voice.playback.speak(&report.spoken_advice).await {
                    log::error!("❌ Voice playback failed: {}", e);
                    println!(
                        "{}",
                        format!("⚠️ Could not play the spoken advice: {}", e).yellow()
                    );
                }
            }
        }
    }

    log::info!("👋 Session ended");
    Ok(())
}

/// Collects one measurement from the prompts. `None` means the user quit.
/// The flag marks voice-sourced input.
async fn read_measurement(
    editor: &mut DefaultEditor,
    voice: Option<&VoiceIo>,
) -> Result<Option<(Measurement, bool)>> {
    loop {
        let Some(line) = prompt(editor, "Enter your weight (kg): ")? else {
            return Ok(None);
        };

        match line.trim() {
            "" => continue,
            "quit" | "q" | "exit" => return Ok(None),
            "speak" | "s" => {
                let Some(voice) = voice else {
                    println!(
                        "{}",
                        "🗣️ Voice input is not available in this session.".yellow()
                    );
                    continue;
                };
                match capture_measurement(voice).await {
                    Some(measurement) => return Ok(Some((measurement, true))),
                    None => continue,
                }
            }
            text => {
                let Some(weight) = parse_input(text, WEIGHT_RANGE_KG, "Weight", "kg") else {
                    continue;
                };

                loop {
                    let Some(line) = prompt(editor, "Enter your height (cm): ")? else {
                        return Ok(None);
                    };
                    match line.trim() {
                        "" => continue,
                        "quit" | "q" | "exit" => return Ok(None),
                        text => {
                            if let Some(height) = parse_input(text, HEIGHT_RANGE_CM, "Height", "cm")
                            {
                                return Ok(Some((Measurement::new(weight, height), false)));
                            }
                        }
                    }
                }
            }
        }
    }
}

/// One spoken attempt: capture, transcribe, pull the two numbers, apply the
/// same form bounds as the typed path.
async fn capture_measurement(voice: &VoiceIo) -> Option<Measurement> {
    println!(
        "{}",
        "🎙️ Speak now, for example: \"I weigh 70 kilograms and I am 175 centimeters tall\""
            .dimmed()
    );

    let transcript = match voice.capture.capture_spoken_text().await {
        Ok(text) => text,
        Err(e) => {
            println!("{}", format!("⚠️ {}", e).yellow());
            return None;
        }
    };

    println!("Heard: {}", transcript.trim().italic());

    let Some(measurement) = Measurement::from_transcript(&transcript) else {
        println!(
            "{}",
            "⚠️ Could not find a weight and a height in that, please try again.".yellow()
        );
        return None;
    };

    if !in_range(measurement.weight_kg, WEIGHT_RANGE_KG) {
        println!("{}", range_warning("Weight", WEIGHT_RANGE_KG, "kg").yellow());
        return None;
    }
    if !in_range(measurement.height_cm, HEIGHT_RANGE_CM) {
        println!("{}", range_warning("Height", HEIGHT_RANGE_CM, "cm").yellow());
        return None;
    }

    Some(measurement)
}

fn parse_input(text: &str, range: (f64, f64), label: &str, unit: &str) -> Option<f64> {
    match text.parse::<f64>() {
        Ok(value) if in_range(value, range) => Some(value),
        Ok(_) => {
            println!("{}", range_warning(label, range, unit).yellow());
            None
        }
        Err(_) => {
            println!("{}", "⚠️ Please enter a number.".yellow());
            None
        }
    }
}

fn in_range(value: f64, (lo, hi): (f64, f64)) -> bool {
    value >= lo && value <= hi
}

fn range_warning(label: &str, (lo, hi): (f64, f64), unit: &str) -> String {
    format!("⚠️ {} must be between {} and {} {}.", label, lo, hi, unit)
}

fn prompt(editor: &mut DefaultEditor, text: &str) -> Result<Option<String>> {
    match editor.readline(text) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = editor.add_history_entry(line.trim());
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
