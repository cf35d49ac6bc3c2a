use feasibility_core::{PolarityError, TextPolarity};

const POSITIVE: &[(&str, f64)] = &[
    ("good", 0.5),
    ("great", 0.7),
    ("excellent", 0.9),
    ("strong", 0.5),
    ("growth", 0.5),
    ("growing", 0.5),
    ("grow", 0.4),
    ("gain", 0.4),
    ("gains", 0.4),
    ("surge", 0.6),
    ("surges", 0.6),
    ("record", 0.4),
    ("boom", 0.6),
    ("booming", 0.6),
    ("profit", 0.5),
    ("profitable", 0.6),
    ("success", 0.6),
    ("successful", 0.6),
    ("innovative", 0.5),
    ("innovation", 0.4),
    ("opportunity", 0.5),
    ("opportunities", 0.5),
    ("demand", 0.3),
    ("rising", 0.4),
    ("rise", 0.3),
    ("optimistic", 0.6),
    ("bullish", 0.7),
    ("expand", 0.4),
    ("expansion", 0.4),
    ("improve", 0.4),
    ("improved", 0.4),
    ("win", 0.5),
    ("breakthrough", 0.7),
    ("resilient", 0.5),
    ("upbeat", 0.5),
];

const NEGATIVE: &[(&str, f64)] = &[
    ("bad", -0.5),
    ("poor", -0.5),
    ("weak", -0.5),
    ("decline", -0.5),
    ("declining", -0.5),
    ("drop", -0.4),
    ("drops", -0.4),
    ("fall", -0.4),
    ("falling", -0.4),
    ("loss", -0.5),
    ("losses", -0.5),
    ("slump", -0.6),
    ("crash", -0.8),
    ("crisis", -0.8),
    ("risk", -0.3),
    ("risky", -0.4),
    ("layoffs", -0.6),
    ("bankrupt", -0.9),
    ("bankruptcy", -0.9),
    ("fraud", -0.9),
    ("lawsuit", -0.6),
    ("stalls", -0.4),
    ("stalled", -0.4),
    ("shortage", -0.5),
    ("recession", -0.7),
    ("bearish", -0.7),
    ("pessimistic", -0.6),
    ("fail", -0.6),
    ("failure", -0.7),
    ("failed", -0.6),
    ("struggle", -0.5),
    ("struggling", -0.5),
    ("downturn", -0.6),
    ("concern", -0.3),
    ("concerns", -0.3),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "without", "hardly", "cannot", "isn't", "aren't", "wasn't", "don't",
    "doesn't", "didn't", "won't", "can't",
];

const INTENSIFIERS: &[&str] = &["very", "extremely", "highly", "really", "significantly", "sharply"];

/// Negation flips and dampens the next scored word.
const NEGATION_FACTOR: f64 = -0.5;
const INTENSIFIER_FACTOR: f64 = 1.5;

/// Word-list polarity: the mean valence of every lexicon word in the text,
/// adjusted by a preceding negator or intensifier. Text with no lexicon
/// words reads as neutral.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconPolarity;

impl LexiconPolarity {
    pub const fn new() -> Self {
        Self
    }

    fn valence(word: &str) -> Option<f64> {
        POSITIVE
            .iter()
            .chain(NEGATIVE)
            .find(|(w, _)| *w == word)
            .map(|(_, v)| *v)
    }
}

impl TextPolarity for LexiconPolarity {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn polarity(&self, text: &str) -> Result<f64, PolarityError> {
        if text.trim().is_empty() {
            return Err(PolarityError("text is empty".to_string()));
        }

        let mut total = 0.0;
        let mut scored = 0usize;
        let mut modifier = 1.0;
        for raw in text.split(|c: char| !(c.is_alphanumeric() || c == '\'')) {
            let word = raw.trim_matches('\'').to_lowercase();
            if word.is_empty() {
                continue;
            }
            if NEGATORS.contains(&word.as_str()) {
                modifier *= NEGATION_FACTOR;
                continue;
            }
            if INTENSIFIERS.contains(&word.as_str()) {
                modifier *= INTENSIFIER_FACTOR;
                continue;
            }
            if let Some(v) = Self::valence(&word) {
                total += (v * modifier).clamp(-1.0, 1.0);
                scored += 1;
            }
            modifier = 1.0;
        }

        if scored == 0 {
            return Ok(0.0);
        }
        Ok((total / scored as f64).clamp(-1.0, 1.0))
    }
}
