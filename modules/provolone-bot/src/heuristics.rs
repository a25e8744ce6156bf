//! Keyword and capitalization heuristics for spotting venue recommendations
//! in comment text.
//!
//! The policy lives in two rule tables, [`RecommendationRules`] and
//! [`NameRules`]. Control flow in the miner never changes when the tables do.

/// Words that name a kind of venue. Matched as lowercase substrings, so
/// "sandwiches" and "shops" count.
pub const VENUE_KEYWORDS: &[&str] = &[
    "deli", "bistro", "cafe", "restaurant", "shop", "market", "sandwich", "subs", "hoagie",
    "hero", "grinder",
];

/// Words that suggest a place on a map.
pub const LOCATION_KEYWORDS: &[&str] = &[
    "street", "avenue", "road", "boulevard", "downtown", "main", "corner", "plaza", "center",
    "mall",
];

/// Whole-word markers that place a name somewhere ("at", "on", ...).
/// A possessive token (`Tony's`) counts as well.
pub const POSITIONAL_WORDS: &[&str] = &["at", "on", "in", "near", "the"];

/// Capitalized words that start sentences or phrases rather than names.
pub const LEAD_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "at", "on", "in", "near", "by", "to", "of", "for",
    "i", "i'm", "i've", "my", "our", "we", "you", "your", "it", "its", "it's", "this", "that",
    "try", "check", "visit", "go", "get", "love", "definitely", "honestly", "yes", "omg",
];

/// Texts this short are assumed to be a bare name.
pub const SHORT_TEXT_MAX_WORDS: usize = 10;

/// Texts this short become the candidate name verbatim when no capitalized
/// pair is found.
pub const WHOLE_TEXT_MAX_WORDS: usize = 3;

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Strip surrounding punctuation but keep apostrophes and ampersands, which
/// are part of names like `Tony's` and `B&B`.
fn clean_word(word: &str) -> &str {
    word.trim_matches(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}' || c == '&'))
}

fn is_possessive(word: &str) -> bool {
    let lower = clean_word(word).to_lowercase();
    lower.len() > 2 && (lower.ends_with("'s") || lower.ends_with("\u{2019}s"))
}

// ---------------------------------------------------------------------------
// RecommendationRules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RecommendationRules {
    pub venue_keywords: Vec<String>,
    pub location_keywords: Vec<String>,
    pub positional_words: Vec<String>,
    pub short_text_max_words: usize,
}

impl Default for RecommendationRules {
    fn default() -> Self {
        Self {
            venue_keywords: owned(VENUE_KEYWORDS),
            location_keywords: owned(LOCATION_KEYWORDS),
            positional_words: owned(POSITIONAL_WORDS),
            short_text_max_words: SHORT_TEXT_MAX_WORDS,
        }
    }
}

impl RecommendationRules {
    /// True when the text plausibly names a venue: a venue keyword, or a
    /// location keyword together with a positional marker, or a short text.
    pub fn looks_like_recommendation(&self, text: &str) -> bool {
        let lower = text.to_lowercase();

        let has_venue_keyword = self.venue_keywords.iter().any(|k| lower.contains(k.as_str()));
        if has_venue_keyword {
            return true;
        }

        let has_location = self.location_keywords.iter().any(|k| lower.contains(k.as_str()));
        if has_location && self.has_positional_marker(text) {
            return true;
        }

        text.split_whitespace().count() <= self.short_text_max_words
    }

    fn has_positional_marker(&self, text: &str) -> bool {
        text.split_whitespace().any(|word| {
            if is_possessive(word) {
                return true;
            }
            let token = clean_word(word).to_lowercase();
            self.positional_words.iter().any(|p| *p == token)
        })
    }
}

// ---------------------------------------------------------------------------
// NameRules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NameRules {
    pub lead_words: Vec<String>,
    pub whole_text_max_words: usize,
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            lead_words: owned(LEAD_WORDS),
            whole_text_max_words: WHOLE_TEXT_MAX_WORDS,
        }
    }
}

impl NameRules {
    /// Pull a candidate venue name out of free text.
    ///
    /// Scans left to right for two adjacent capitalized words and returns the
    /// first pair. A pair never starts on a lead word and never spans a
    /// sentence break. With no pair, a text of at most
    /// `whole_text_max_words` words is returned whole (surrounding punctuation
    /// trimmed); otherwise `None`.
    pub fn extract_name(&self, text: &str) -> Option<String> {
        let words: Vec<&str> = text.split_whitespace().collect();

        for pair in words.windows(2) {
            let (first, second) = (pair[0], pair[1]);
            if ends_clause(first) {
                continue;
            }
            let (first, second) = (clean_word(first), clean_word(second));
            if self.is_name_word(first) && is_capitalized(second) {
                return Some(format!("{first} {second}"));
            }
        }

        let whole = clean_word(text.trim());
        if !whole.is_empty() && words.len() <= self.whole_text_max_words {
            return Some(whole.to_string());
        }
        None
    }

    fn is_name_word(&self, word: &str) -> bool {
        if !is_capitalized(word) {
            return false;
        }
        let lower = word.to_lowercase();
        !self.lead_words.iter().any(|w| *w == lower)
    }
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn ends_clause(word: &str) -> bool {
    word.ends_with(['.', '!', '?', ',', ';', ':'])
}
