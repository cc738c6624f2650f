//! Prompt construction and response validation for word generation

use serde::{Deserialize, Serialize};

use super::{LlmError, LlmResult};
use crate::types::{Locale, WordWithHints};

/// Every generated word carries exactly this many hints
pub const HINTS_PER_WORD: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptConfig {
    pub category: String,
    pub language: Locale,
    pub count: usize,
    pub difficulty: Difficulty,
}

/// Expected JSON shape of a generation response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordsResponse {
    pub words_with_hints: Vec<WordWithHints>,
}

/// System prompt shared by all providers
pub const SYSTEM_PROMPT: &str = "You generate secret words and hints for a party game \
    in which one player does not know the word. Respond only with valid JSON.";

fn cultural_note(language: Locale) -> &'static str {
    match language {
        Locale::En => "Focus on universally known terms in English-speaking countries.",
        Locale::De => "Fokussiere auf universell bekannte Begriffe im deutschsprachigen Raum.",
    }
}

fn example(language: Locale, category: &str) -> Option<(&'static str, [&'static str; 3])> {
    let example = match (language, category) {
        (Locale::En, "animals") => ("elephant", ["large", "grey", "African"]),
        (Locale::En, "food") => ("pizza", ["Italian", "round", "cheese"]),
        (Locale::En, "objects") => ("hammer", ["tool", "metal", "nails"]),
        (Locale::En, "places") => ("library", ["quiet", "book", "borrow"]),
        (Locale::En, "professions") => ("chef", ["cut", "white", "TV show"]),
        (Locale::De, "animals") => ("Elefant", ["Säugetier", "Grau", "Afrika"]),
        (Locale::De, "food") => ("Pizza", ["italienisch", "rund", "Käse"]),
        (Locale::De, "objects") => ("Hammer", ["Werkzeug", "Metall", "Nägel"]),
        (Locale::De, "places") => ("Bibliothek", ["ruhig", "Bücher", "ausleihen"]),
        (Locale::De, "professions") => ("Koch", ["schneiden", "weiß", "Fernsehshow"]),
        _ => return None,
    };
    Some(example)
}

fn difficulty_modifier(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => {
            "Choose very common, everyday words that most people would recognize immediately."
        }
        Difficulty::Medium => {
            "Choose moderately common words that require some thinking but are still well-known."
        }
        Difficulty::Hard => {
            "Choose less common but still recognizable words that provide a good challenge."
        }
    }
}

fn category_context(category: &str) -> &'static str {
    match category {
        "animals" => "Include domestic, wild, and exotic animals. Mix common pets with wildlife.",
        "food" => "Include dishes, ingredients, cooking methods, and food items from various cuisines.",
        "objects" => "Include household items, tools, furniture, technology, and everyday objects.",
        "places" => "Include buildings, locations, geographical features, and establishments.",
        "professions" => "Include traditional and modern jobs, skilled trades, and professional roles.",
        "movies" => "Include popular films, classic movies, and well-known franchises.",
        "sports" => "Include popular sports, equipment, positions, and game terminology.",
        "music" => "Include instruments, genres, musical terms, and performance concepts.",
        "nature" => "Include natural phenomena, landscapes, weather, and environmental features.",
        "technology" => "Include devices, software, digital concepts, and modern innovations.",
        _ => "Generate appropriate words for this category.",
    }
}

/// Build the user prompt for a generation request
pub fn create_prompt(config: &PromptConfig) -> String {
    let key = config.category.to_lowercase();

    let example_block = example(config.language, &key)
        .map(|(word, hints)| {
            let sample = WordsResponse {
                words_with_hints: vec![WordWithHints {
                    word: word.to_string(),
                    hints: hints.iter().map(|h| h.to_string()).collect(),
                }],
            };
            let json = serde_json::to_string_pretty(&sample).unwrap_or_default();
            format!("EXAMPLE FORMAT:\n{}\n\n", json)
        })
        .unwrap_or_default();

    format!(
        r#"Generate {count} words for the category "{category}" in {language}.

CATEGORY CONTEXT: {context}

DIFFICULTY LEVEL: {difficulty}

CULTURAL CONSIDERATION: {culture}

WORD SELECTION CRITERIA:
- Words must be nouns (things, not actions or descriptions)
- Avoid abbreviations, acronyms, or technical jargon
- No offensive or inappropriate content
- Ensure words are spell-able and pronounceable
- Mix different subcategories within the main category

HINT CRAFTING RULES:
1. First hint: Broad category or primary function
2. Second hint: Key characteristic or common association
3. Third hint: Distinctive feature or specific context
4. Each hint should be 1-4 words maximum
5. Progressive difficulty: general -> specific -> distinctive
6. Avoid rhymes, wordplay, or linguistic tricks
7. No synonyms or direct translations of the target word

QUALITY ASSURANCE:
- Each word must have exactly 3 hints
- Hints must be helpful for guessing but not too obvious
- Ensure variety in word length and complexity within the set

{example}Generate exactly {count} words following this structure. Respond only with valid JSON in this exact format:

{{
  "wordsWithHints": [
    {{
      "word": "example",
      "hints": ["hint one", "hint two", "hint three"]
    }}
  ]
}}"#,
        count = config.count,
        category = config.category,
        language = config.language.language_name(),
        context = category_context(&key),
        difficulty = difficulty_modifier(config.difficulty),
        culture = cultural_note(config.language),
        example = example_block,
    )
}

/// Check the response shape: exact count, non-empty words, three non-empty hints each
pub fn validate_response(response: &WordsResponse, expected_count: usize) -> LlmResult<()> {
    if response.words_with_hints.len() != expected_count {
        return Err(LlmError::ParseError(format!(
            "Expected {} words, got {}",
            expected_count,
            response.words_with_hints.len()
        )));
    }

    for (i, item) in response.words_with_hints.iter().enumerate() {
        if item.word.trim().is_empty() {
            return Err(LlmError::ParseError(format!("Word {} is empty", i)));
        }
        if item.hints.len() != HINTS_PER_WORD {
            return Err(LlmError::ParseError(format!(
                "Word '{}' has {} hints, expected {}",
                item.word,
                item.hints.len(),
                HINTS_PER_WORD
            )));
        }
        if item.hints.iter().any(|h| h.trim().is_empty()) {
            return Err(LlmError::ParseError(format!(
                "Word '{}' has an empty hint",
                item.word
            )));
        }
    }

    Ok(())
}

/// Models like to wrap JSON in a markdown fence; cut down to the outermost object
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// Parse and validate raw model output
pub fn parse_response(text: &str, expected_count: usize) -> LlmResult<Vec<WordWithHints>> {
    let response: WordsResponse = serde_json::from_str(extract_json(text))
        .map_err(|e| LlmError::ParseError(e.to_string()))?;
    validate_response(&response, expected_count)?;

    Ok(response
        .words_with_hints
        .into_iter()
        .map(|w| WordWithHints {
            word: w.word.trim().to_string(),
            hints: w.hints.iter().map(|h| h.trim().to_string()).collect(),
        })
        .collect())
}
