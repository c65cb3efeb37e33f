use fluent_templates::{static_loader, Loader};
use once_cell::sync::Lazy;
use unic_langid::LanguageIdentifier;

use crate::core::config;
use crate::storage::db::{self, DbConnection, DbPool};

static_loader! {
    static LOCALES = {
        locales: "./locales",
        fallback_language: "en",
    };
}

/// Supported languages (code, human-readable name).
pub static SUPPORTED_LANGS: &[(&str, &str)] = &[("en", "English"), ("ru", "Русский")];

/// Default language identifier, from BOT_TELEGRAM_LANGUAGE_CODE.
static DEFAULT_LANG: Lazy<LanguageIdentifier> = Lazy::new(|| {
    config::DEFAULT_LANGUAGE
        .parse()
        .unwrap_or_else(|_| "en".parse().unwrap_or_default())
});

/// Normalizes a language code into a LanguageIdentifier (falls back to default).
pub fn lang_from_code(code: &str) -> LanguageIdentifier {
    let normalized = code.split('-').next().unwrap_or(code).to_lowercase();
    normalized.parse().unwrap_or_else(|_| DEFAULT_LANG.clone())
}

/// Checks if a language code is supported by the bot.
/// Returns the normalized language code if supported, None otherwise.
pub fn is_language_supported(code: &str) -> Option<&'static str> {
    let normalized = code.split('-').next().unwrap_or(code).to_lowercase();
    SUPPORTED_LANGS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(&normalized))
        .map(|(c, _)| *c)
}

/// Resolves the language for a user from the database using an existing connection.
pub fn user_lang(conn: &DbConnection, telegram_id: i64) -> LanguageIdentifier {
    match db::get_user_language(conn, telegram_id) {
        Ok(lang_code) => lang_from_code(&lang_code),
        Err(_) => DEFAULT_LANG.clone(),
    }
}

/// Resolves the language for a user using a connection pool.
pub fn user_lang_from_pool(db_pool: &DbPool, telegram_id: i64) -> LanguageIdentifier {
    if let Ok(conn) = db::get_connection(db_pool) {
        return user_lang(&conn, telegram_id);
    }
    DEFAULT_LANG.clone()
}

/// Picks the stored language for a user, or their Telegram locale when it is
/// supported, or the configured default.
pub fn resolve_language(stored: Option<&str>, telegram_code: Option<&str>) -> String {
    if let Some(code) = stored.and_then(is_language_supported) {
        return code.to_string();
    }
    if let Some(code) = telegram_code.and_then(is_language_supported) {
        return code.to_string();
    }
    DEFAULT_LANG.language.as_str().to_string()
}

/// Returns a localized string for the given key. Falls back to the default
/// language, and to the key itself when no bundle knows it.
pub fn t(lang: &LanguageIdentifier, key: &str) -> String {
    LOCALES.lookup(lang, key).unwrap_or_else(|| {
        LOCALES
            .lookup(&DEFAULT_LANG, key)
            .unwrap_or_else(|| key.to_string())
    })
}

/// Returns a localized string with `%placeholder%` substitutions applied.
///
/// Interpolation is plain string replacement; the locale files use the same
/// `%name%` markers in every language. Fluent placeables are avoided so the
/// `.ftl` files stay trivial to edit.
pub fn t_with(lang: &LanguageIdentifier, key: &str, substitutions: &[(&str, &str)]) -> String {
    let mut text = t(lang, key);
    for (name, value) in substitutions {
        text = text.replace(&format!("%{name}%"), value);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_known_translation() {
        let en = lang_from_code("en");
        let ru = lang_from_code("ru");

        assert_eq!(t(&en, "cart-empty"), "Your cart is empty.");
        assert_eq!(t(&ru, "cart-empty"), "Ваша корзина пуста.");
    }

    #[test]
    fn missing_key_falls_back_to_the_key() {
        let en = lang_from_code("en");
        assert_eq!(t(&en, "no-such-key"), "no-such-key");
    }

    #[test]
    fn substitutes_placeholders() {
        let en = lang_from_code("en");
        let text = t_with(&en, "category-products-header", &[("category", "Books")]);
        assert!(text.contains("Books"));
        assert!(!text.contains("%category%"));
    }

    #[test]
    fn test_is_language_supported() {
        assert_eq!(is_language_supported("en"), Some("en"));
        assert_eq!(is_language_supported("ru"), Some("ru"));

        // Variants normalize to the base language
        assert_eq!(is_language_supported("en-US"), Some("en"));
        assert_eq!(is_language_supported("ru-RU"), Some("ru"));
        assert_eq!(is_language_supported("EN"), Some("en"));

        // Unsupported languages
        assert_eq!(is_language_supported("es"), None);
        assert_eq!(is_language_supported("unknown"), None);
    }

    #[test]
    fn resolve_language_prefers_stored_over_telegram() {
        assert_eq!(resolve_language(Some("ru"), Some("en")), "ru");
        assert_eq!(resolve_language(None, Some("ru-RU")), "ru");
        assert_eq!(resolve_language(None, Some("es")), "en");
        assert_eq!(resolve_language(None, None), "en");
    }
}
