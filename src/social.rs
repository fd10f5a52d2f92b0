use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

/// Companionship phrases per language code.
fn phrases(language: &str) -> Option<&'static [&'static str]> {
    match language {
        "ta" => Some(&["எல்லாம் நல்லா இருக்கா?", "ஒரு பாட்டு பாடவா?"]),
        "hi" => Some(&["सब ठीक है?", "एक गाना सुनाएं?"]),
        "te" => Some(&["అంతా బాగుందా?", "ఒక పాట పాడనా?"]),
        "en" => Some(&["Is everything okay?", "Shall I play a song?"]),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialPrompt {
    pub language: String,
    pub message: &'static str,
}

/// Low-priority prompts. Never escalates and never persists.
pub struct SocialSource {
    languages: Vec<String>,
    probability: f64,
    rng: StdRng,
}

impl SocialSource {
    pub fn new(languages: &[String], probability: f64) -> Self {
        Self::with_rng(languages, probability, StdRng::from_entropy())
    }

    pub fn with_rng(languages: &[String], probability: f64, rng: StdRng) -> Self {
        let languages = languages
            .iter()
            .filter(|lang| {
                let known = phrases(lang).is_some();
                if !known {
                    log::warn!("No companionship phrases for language '{lang}', skipping");
                }
                known
            })
            .cloned()
            .collect();

        Self {
            languages,
            probability: probability.clamp(0.0, 1.0),
            rng,
        }
    }

    pub fn poll(&mut self) -> Option<SocialPrompt> {
        if !self.rng.gen_bool(self.probability) {
            return None;
        }

        let language = self.languages.choose(&mut self.rng)?.clone();
        let message = *phrases(&language)?.choose(&mut self.rng)?;
        Some(SocialPrompt { language, message })
    }
}
