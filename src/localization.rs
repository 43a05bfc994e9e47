use anyhow::{Context, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

/// Language used when the user's language is unknown or unsupported
pub const DEFAULT_LANGUAGE: &str = "ru";

/// Languages with a bundled resource file
pub const SUPPORTED_LANGUAGES: [&str; 2] = ["ru", "en"];

fn bundled_resource(locale: &str) -> Option<&'static str> {
    match locale {
        "ru" => Some(include_str!("../locales/ru/main.ftl")),
        "en" => Some(include_str!("../locales/en/main.ftl")),
        _ => None,
    }
}

/// Localization manager for the vocabulary bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl std::fmt::Debug for LocalizationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizationManager")
            .field("languages", &self.bundles.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LocalizationManager {
    /// Create a new localization manager with every supported locale loaded
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for locale_str in SUPPORTED_LANGUAGES {
            let locale: LanguageIdentifier = locale_str
                .parse()
                .with_context(|| format!("Invalid locale identifier: {}", locale_str))?;
            let bundle = Self::create_bundle(&locale, locale_str)?;
            bundles.insert(locale_str.to_string(), bundle);
        }

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(
        locale: &LanguageIdentifier,
        locale_str: &str,
    ) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Plain text output; Telegram renders bidi isolation marks literally
        bundle.set_use_isolating(false);

        let content = bundled_resource(locale_str)
            .with_context(|| format!("No resource bundled for locale {}", locale_str))?;
        let resource = FluentResource::try_new(content.to_string())
            .map_err(|(_, errors)| anyhow::anyhow!("Invalid {} resource: {:?}", locale_str, errors))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow::anyhow!("Duplicate {} messages: {:?}", locale_str, errors))?;

        Ok(bundle)
    }

    /// Get a localized message in a specific language
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&[(&str, &str)]>,
    ) -> String {
        let bundle = match self.bundles.get(language) {
            Some(bundle) => bundle,
            None => match self.bundles.get(DEFAULT_LANGUAGE) {
                Some(bundle) => bundle,
                None => return format!("Missing translation: {}", key),
            },
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {}", key),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                // Numbers stay numbers so plural selectors work
                match value.parse::<i64>() {
                    Ok(number) => fluent_args.set(*name, FluentValue::from(number)),
                    Err(_) => fluent_args.set(*name, FluentValue::from(*value)),
                }
            }
            fluent_args
        });

        let mut errors = vec![];
        bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors)
            .into_owned()
    }

    /// The message for `key` in every supported language
    pub fn all_variants(&self, key: &str) -> Vec<String> {
        SUPPORTED_LANGUAGES
            .iter()
            .map(|language| self.get_message_in_language(key, language, None))
            .collect()
    }

    /// Check if a language is supported
    pub fn is_language_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }
}

/// Create the shared localization manager
pub fn create_localization_manager() -> Result<Arc<LocalizationManager>> {
    Ok(Arc::new(LocalizationManager::new()?))
}

/// Convenience function to get a localized message in user's language
pub fn t_lang(
    localization: &Arc<LocalizationManager>,
    key: &str,
    language_code: Option<&str>,
) -> String {
    let language = detect_language(language_code);
    localization.get_message_in_language(key, &language, None)
}

/// Convenience function to get a localized message with arguments in user's language
pub fn t_args_lang(
    localization: &Arc<LocalizationManager>,
    key: &str,
    args: &[(&str, &str)],
    language_code: Option<&str>,
) -> String {
    let language = detect_language(language_code);
    localization.get_message_in_language(key, &language, Some(args))
}

/// Detect the appropriate language based on user's Telegram language code
pub fn detect_language(language_code: Option<&str>) -> String {
    if let Some(code) = language_code {
        // "en-US" -> "en"
        let lang = code.split(['-', '_']).next().unwrap_or(code).to_lowercase();
        if SUPPORTED_LANGUAGES.contains(&lang.as_str()) {
            return lang;
        }
    }

    DEFAULT_LANGUAGE.to_string()
}
