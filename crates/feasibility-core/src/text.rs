//! Keyword matching over idea text.
//!
//! Terms are matched on word boundaries. A trailing `*` turns a term into a
//! prefix match (`regulat*` hits "regulated" and "regulatory"), and terms
//! with spaces or hyphens match as whole phrases.

pub(crate) struct TextFeatures {
    tokens: Vec<String>,
    padded: String,
}

impl TextFeatures {
    pub(crate) fn new(text: &str) -> Self {
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();
        let padded = format!(" {} ", tokens.join(" "));
        Self { tokens, padded }
    }

    pub(crate) fn contains(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        if let Some(stem) = term.strip_suffix('*') {
            return self.tokens.iter().any(|t| t.starts_with(stem));
        }
        let phrase = term
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>();
        match phrase.as_slice() {
            [] => false,
            [single] => self.tokens.iter().any(|t| t == single),
            words => self.padded.contains(&format!(" {} ", words.join(" "))),
        }
    }

    pub(crate) fn matches<'a>(&self, terms: &[&'a str]) -> Vec<&'a str> {
        terms.iter().copied().filter(|t| self.contains(t)).collect()
    }

    pub(crate) fn any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|t| self.contains(t))
    }
}
