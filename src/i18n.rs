//! Translation capability and locale detection

use axum::http::{header, HeaderMap};

use crate::types::Locale;

/// Cookie names the UI uses to remember the chosen language
pub const LOCALE_COOKIES: &[&str] = &["NEXT_LOCALE", "locale"];

/// Looks up user-facing strings by key
pub trait Translator: Send + Sync {
    /// Unknown keys come back unchanged
    fn translate(&self, key: &str) -> String;
}

/// Built-in table for the handful of strings the game core produces
#[derive(Debug, Clone, Copy)]
pub struct StaticTranslator {
    pub locale: Locale,
}

impl StaticTranslator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }
}

impl Translator for StaticTranslator {
    fn translate(&self, key: &str) -> String {
        let text = match (self.locale, key) {
            (Locale::En, "player") => "Player",
            (Locale::De, "player") => "Spieler",
            (Locale::En, "noCategorySelected") => "Please select at least one category",
            (Locale::De, "noCategorySelected") => "Bitte wähle mindestens eine Kategorie aus",
            (Locale::En, "animals") => "Animals",
            (Locale::De, "animals") => "Tiere",
            (Locale::En, "food") => "Food",
            (Locale::De, "food") => "Essen",
            (Locale::En, "objects") => "Objects",
            (Locale::De, "objects") => "Gegenstände",
            (Locale::En, "movies") => "Movies",
            (Locale::De, "movies") => "Filme",
            (Locale::En, "places") => "Places",
            (Locale::De, "places") => "Orte",
            (Locale::En, "professions") => "Professions",
            (Locale::De, "professions") => "Berufe",
            _ => key,
        };
        text.to_string()
    }
}

/// Read the locale cookie from a `Cookie` header value
pub fn locale_from_cookie(cookie_header: &str) -> Option<Locale> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| LOCALE_COOKIES.contains(&name.trim()))
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// Pick the supported language with the highest quality from `Accept-Language`
pub fn locale_from_accept_language(header_value: &str) -> Option<Locale> {
    let mut languages: Vec<(&str, f32)> = header_value
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(";q=");
            let tag = pieces.next()?.trim();
            let quality = pieces
                .next()
                .and_then(|q| q.trim().parse().ok())
                .unwrap_or(1.0);
            let primary = tag.split('-').next()?;
            Some((primary, quality))
        })
        .collect();

    // Stable sort keeps header order for equal weights
    languages.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    languages
        .into_iter()
        .find_map(|(code, _)| code.parse::<Locale>().ok())
}

/// Locale from request headers: cookie first, then `Accept-Language`
pub fn locale_from_headers(headers: &HeaderMap) -> Option<Locale> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(locale_from_cookie);

    from_cookie.or_else(|| {
        headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(locale_from_accept_language)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_static_translator() {
        assert_eq!(StaticTranslator::new(Locale::En).translate("player"), "Player");
        assert_eq!(StaticTranslator::new(Locale::De).translate("player"), "Spieler");
        assert_eq!(
            StaticTranslator::new(Locale::De).translate("unknown.key"),
            "unknown.key"
        );
    }

    #[test]
    fn test_cookie_parsing() {
        assert_eq!(
            locale_from_cookie("theme=dark; NEXT_LOCALE=en; other=1"),
            Some(Locale::En)
        );
        assert_eq!(locale_from_cookie("locale=de"), Some(Locale::De));
        assert_eq!(locale_from_cookie("NEXT_LOCALE=fr"), None);
        assert_eq!(locale_from_cookie(""), None);
    }

    #[test]
    fn test_accept_language_respects_quality() {
        assert_eq!(
            locale_from_accept_language("fr-FR,en;q=0.5,de;q=0.8"),
            Some(Locale::De)
        );
        assert_eq!(
            locale_from_accept_language("en-US,en;q=0.9,de;q=0.8"),
            Some(Locale::En)
        );
        assert_eq!(locale_from_accept_language("fr,es;q=0.9"), None);
    }

    #[test]
    fn test_headers_prefer_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));
        assert_eq!(locale_from_headers(&headers), Some(Locale::En));

        headers.insert(header::COOKIE, HeaderValue::from_static("NEXT_LOCALE=de"));
        assert_eq!(locale_from_headers(&headers), Some(Locale::De));
    }
}
