//! Static fallback words, used when neither the cache nor a generator can
//! provide a word. Entries are never consumed.

use crate::types::{Locale, WordWithHints};
use rand::seq::IndexedRandom;

/// A built-in word with hints
#[derive(Debug, Clone, Copy)]
pub struct StaticWord {
    pub word: &'static str,
    pub hints: &'static [&'static str],
}

impl StaticWord {
    pub fn to_word(&self) -> WordWithHints {
        WordWithHints {
            word: self.word.to_string(),
            hints: self.hints.iter().map(|h| h.to_string()).collect(),
        }
    }
}

macro_rules! words {
    ($($word:literal => [$($hint:literal),* $(,)?]),* $(,)?) => {
        &[$(StaticWord { word: $word, hints: &[$($hint),*] }),*]
    };
}

const EN_ANIMALS: &[StaticWord] = words![
    "elephant" => ["large", "gray", "trunk", "africa"],
    "cat" => ["pet", "meow", "furry", "whiskers"],
    "lion" => ["mane", "roar", "king", "safari"],
    "dolphin" => ["smart", "ocean", "playful", "jump"],
    "tiger" => ["stripes", "orange", "fierce", "jungle"],
    "rabbit" => ["hop", "ears", "carrot", "soft"],
    "wolf" => ["pack", "howl", "forest", "wild"],
    "bear" => ["honey", "cave", "strong", "sleep"],
];

const EN_FOOD: &[StaticWord] = words![
    "pizza" => ["round", "cheese", "italian", "slice"],
    "sushi" => ["raw", "rice", "japanese", "roll"],
    "burger" => ["bun", "meat", "american", "fast"],
    "pasta" => ["noodles", "sauce", "italian", "fork"],
    "chocolate" => ["sweet", "brown", "cocoa", "dessert"],
    "apple" => ["red", "fruit", "tree", "crisp"],
    "cake" => ["sweet", "birthday", "layers", "frosting"],
    "soup" => ["liquid", "warm", "spoon", "bowl"],
];

const EN_OBJECTS: &[StaticWord] = words![
    "chair" => ["sit", "legs", "furniture", "wood"],
    "lamp" => ["light", "bright", "switch", "shade"],
    "book" => ["pages", "read", "story", "paper"],
    "phone" => ["call", "screen", "pocket", "ring"],
    "car" => ["drive", "wheels", "engine", "road"],
    "computer" => ["screen", "keyboard", "digital", "work"],
    "clock" => ["time", "tick", "numbers", "wall"],
    "mirror" => ["reflect", "glass", "image", "see"],
];

const DE_ANIMALS: &[StaticWord] = words![
    "Elefant" => ["Groß", "Grau", "Rüssel", "Afrika"],
    "Katze" => ["Haustier", "Miau", "Pelzig", "Schnurren"],
    "Löwe" => ["Mähne", "Brüllen", "König", "Safari"],
    "Delfin" => ["Klug", "Ozean", "Verspielt", "Springen"],
    "Tiger" => ["Streifen", "Orange", "Wild", "Dschungel"],
    "Hase" => ["Hüpfen", "Ohren", "Karotte", "Weich"],
    "Wolf" => ["Rudel", "Heulen", "Wald", "Wild"],
    "Bär" => ["Honig", "Höhle", "Stark", "Schlafen"],
];

const DE_FOOD: &[StaticWord] = words![
    "Pizza" => ["Rund", "Käse", "Italienisch", "Stück"],
    "Sushi" => ["Roh", "Reis", "Japanisch", "Rolle"],
    "Burger" => ["Brötchen", "Fleisch", "Amerikanisch", "Schnell"],
    "Nudeln" => ["Teig", "Soße", "Italienisch", "Gabel"],
    "Schokolade" => ["Süß", "Braun", "Kakao", "Nachtisch"],
    "Apfel" => ["Rot", "Frucht", "Baum", "Knackig"],
    "Kuchen" => ["Süß", "Geburtstag", "Schichten", "Glasur"],
    "Suppe" => ["Flüssig", "Warm", "Löffel", "Schüssel"],
];

const DE_OBJECTS: &[StaticWord] = words![
    "Stuhl" => ["Sitzen", "Beine", "Möbel", "Holz"],
    "Lampe" => ["Licht", "Hell", "Schalter", "Schirm"],
    "Buch" => ["Seiten", "Lesen", "Geschichte", "Papier"],
    "Telefon" => ["Anrufen", "Bildschirm", "Tasche", "Klingeln"],
    "Auto" => ["Fahren", "Räder", "Motor", "Straße"],
    "Computer" => ["Bildschirm", "Tastatur", "Digital", "Arbeit"],
    "Uhr" => ["Zeit", "Ticken", "Zahlen", "Wand"],
    "Spiegel" => ["Spiegeln", "Glas", "Bild", "Sehen"],
];

/// Look up the fallback table for a language and (lowercased) category.
/// Unknown combinations yield an empty slice.
pub fn lookup(language: Locale, category: &str) -> &'static [StaticWord] {
    match (language, category) {
        (Locale::En, "animals") => EN_ANIMALS,
        (Locale::En, "food") => EN_FOOD,
        (Locale::En, "objects") => EN_OBJECTS,
        (Locale::De, "animals") => DE_ANIMALS,
        (Locale::De, "food") => DE_FOOD,
        (Locale::De, "objects") => DE_OBJECTS,
        _ => &[],
    }
}

/// Pick a random fallback word, if the table has an entry for the category
pub fn random_word(language: Locale, category: &str) -> Option<WordWithHints> {
    let mut rng = rand::rng();
    lookup(language, category)
        .choose(&mut rng)
        .map(StaticWord::to_word)
}

/// Last-resort word used when nothing else knows the category
pub fn placeholder(language: Locale) -> WordWithHints {
    let (word, hints): (&str, [&str; 3]) = match language {
        Locale::En => ("mystery", ["unknown", "hidden", "secret"]),
        Locale::De => ("geheimnis", ["unbekannt", "versteckt", "geheim"]),
    };
    WordWithHints {
        word: word.to_string(),
        hints: hints.iter().map(|h| h.to_string()).collect(),
    }
}
