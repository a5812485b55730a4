use serde::{Deserialize, Serialize};

/// Interactive form bounds: weight 10-300 kg, height 50-250 cm.
pub const WEIGHT_RANGE_KG: (f64, f64) = (10.0, 300.0);
pub const HEIGHT_RANGE_CM: (f64, f64) = (50.0, 250.0);

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Measurement {
    pub weight_kg: f64,
    pub height_cm: f64,
}

impl Measurement {
    pub fn new(weight_kg: f64, height_cm: f64) -> Self {
        Self {
            weight_kg,
            height_cm,
        }
    }

    /// BMI from kilograms and centimeters. `None` until a positive height
    /// is available; weight is only bounded by the form.
    pub fn bmi(&self) -> Option<f64> {
        if self.height_cm <= 0.0 {
            return None;
        }
        let height_m = self.height_cm / 100.0;
        Some(self.weight_kg / (height_m * height_m))
    }

    /// Reads the first two numbers out of a transcript ("I weigh 70 kg and
    /// I am 175 cm tall") positionally as weight then height.
    pub fn from_transcript(text: &str) -> Option<Self> {
        let numbers = extract_numbers(text);
        if numbers.len() < 2 {
            return None;
        }
        Some(Self::new(numbers[0], numbers[1]))
    }
}

/// Scans text for decimal numeric substrings, in order of appearance.
pub fn extract_numbers(text: &str) -> Vec<f64> {
    let mut numbers = Vec::new();
    let mut current = String::new();

    let mut flush = |current: &mut String| {
        if !current.is_empty() {
            if let Ok(n) = current.parse::<f64>() {
                numbers.push(n);
            }
            current.clear();
        }
    };

    for c in text.chars() {
        if c.is_ascii_digit() || (c == '.' && !current.is_empty() && !current.contains('.')) {
            current.push(c);
        } else {
            flush(&mut current);
        }
    }
    flush(&mut current);

    numbers
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
}

impl BmiCategory {
    /// Fixed thresholds; 18.5 and 24.9 both land in Normal.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi <= 24.9 {
            BmiCategory::Normal
        } else {
            BmiCategory::Overweight
        }
    }

    /// The advice request sent to the model for this category (1:1).
    pub fn advice_prompt(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => {
                "Suggest a healthy way to gain weight for an underweight person using diet and exercise."
            }
            BmiCategory::Normal => {
                "Suggest how to maintain current healthy weight through lifestyle and diet."
            }
            BmiCategory::Overweight => {
                "Suggest a healthy way to lose weight for an overweight person using diet and exercise."
            }
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
        };
        write!(f, "{}", s)
    }
}

/// How raw assistant text is normalized for display. Selected by the
/// caller; the pipe-aware mode exists because some prompts make the model
/// answer with pipe-delimited text instead of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceFormat {
    Bulleted,
    PipeAware,
    Concise,
    Raw,
}

impl AdviceFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "bulleted" | "bullets" => Some(AdviceFormat::Bulleted),
            "pipe" | "pipeaware" => Some(AdviceFormat::PipeAware),
            "concise" => Some(AdviceFormat::Concise),
            "raw" => Some(AdviceFormat::Raw),
            _ => None,
        }
    }

    pub fn render(&self, advice: &str) -> String {
        match self {
            AdviceFormat::Bulleted => bullet_lines(&split_segments(advice, '\n')),
            AdviceFormat::PipeAware => {
                let sep = if advice.contains('|') { '|' } else { '\n' };
                bullet_lines(&split_segments(advice, sep))
            }
            AdviceFormat::Concise => split_segments(advice, '\n').join(" | "),
            AdviceFormat::Raw => advice.to_string(),
        }
    }
}

fn split_segments(text: &str, sep: char) -> Vec<String> {
    text.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn bullet_lines(segments: &[String]) -> String {
    segments
        .iter()
        .map(|s| format!("- {}", s))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One completed user action: the computed value, its category, and the
/// advice text (or the warning that replaced it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmiReport {
    pub bmi: f64,
    pub category: BmiCategory,
    pub advice: String,
    pub spoken_advice: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmi_matches_formula() {
        let m = Measurement::new(70.0, 175.0);
        let bmi = m.bmi().unwrap();
        assert!((bmi - 70.0 / (1.75_f64 * 1.75)).abs() < 1e-9);
    }

    #[test]
    fn non_positive_height_yields_no_bmi() {
        assert!(Measurement::new(70.0, 0.0).bmi().is_none());
        assert!(Measurement::new(70.0, -5.0).bmi().is_none());
    }

    #[test]
    fn category_boundaries_are_closed_correctly() {
        assert_eq!(BmiCategory::from_bmi(18.49), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(24.9), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(24.91), BmiCategory::Overweight);
    }

    #[test]
    fn each_category_has_its_own_prompt() {
        assert!(BmiCategory::Underweight.advice_prompt().contains("gain weight"));
        assert!(BmiCategory::Normal.advice_prompt().contains("maintain"));
        assert!(BmiCategory::Overweight.advice_prompt().contains("lose weight"));
    }

    #[test]
    fn bulleted_drops_blank_segments() {
        let rendered = AdviceFormat::Bulleted.render("A\n\nB\n");
        assert_eq!(rendered, "- A\n- B");
    }

    #[test]
    fn pipe_aware_splits_on_pipes_when_present() {
        let rendered = AdviceFormat::PipeAware.render("A | B | ");
        assert_eq!(rendered, "- A\n- B");
    }

    #[test]
    fn pipe_aware_falls_back_to_newlines() {
        let rendered = AdviceFormat::PipeAware.render("A\nB");
        assert_eq!(rendered, "- A\n- B");
    }

    #[test]
    fn concise_joins_into_one_line() {
        let rendered = AdviceFormat::Concise.render("A\nB");
        assert_eq!(rendered, "A | B");
    }

    #[test]
    fn raw_is_identity() {
        let text = "A\n\nB | C";
        assert_eq!(AdviceFormat::Raw.render(text), text);
    }

    #[test]
    fn format_names_parse() {
        assert_eq!(AdviceFormat::from_name("Bulleted"), Some(AdviceFormat::Bulleted));
        assert_eq!(AdviceFormat::from_name("pipe"), Some(AdviceFormat::PipeAware));
        assert_eq!(AdviceFormat::from_name("concise"), Some(AdviceFormat::Concise));
        assert_eq!(AdviceFormat::from_name("raw"), Some(AdviceFormat::Raw));
        assert_eq!(AdviceFormat::from_name("fancy"), None);
    }

    #[test]
    fn transcript_parses_first_two_numbers() {
        let m = Measurement::from_transcript("I weigh 70 kg and I am 175 cm tall").unwrap();
        assert_eq!(m.weight_kg, 70.0);
        assert_eq!(m.height_cm, 175.0);
    }

    #[test]
    fn transcript_accepts_decimals() {
        let m = Measurement::from_transcript("about 70.5 kilos, 175.5 centimeters").unwrap();
        assert_eq!(m.weight_kg, 70.5);
        assert_eq!(m.height_cm, 175.5);
    }

    #[test]
    fn transcript_with_fewer_than_two_numbers_is_rejected() {
        assert!(Measurement::from_transcript("I weigh 70 kg").is_none());
        assert!(Measurement::from_transcript("no numbers here").is_none());
    }

    #[test]
    fn extra_numbers_are_ignored() {
        let m = Measurement::from_transcript("70 kg, 175 cm, 42 years old").unwrap();
        assert_eq!(m.weight_kg, 70.0);
        assert_eq!(m.height_cm, 175.0);
    }

    #[test]
    fn sentence_punctuation_does_not_merge_numbers() {
        assert_eq!(extract_numbers("tall. 175"), vec![175.0]);
        assert_eq!(extract_numbers("70. And 175."), vec![70.0, 175.0]);
    }
}
