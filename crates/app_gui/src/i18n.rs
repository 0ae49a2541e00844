use leaf_core::{Language, LanguagePreference};

pub(crate) fn resolve(preference: LanguagePreference) -> Language {
    let locale = sys_locale::get_locale();
    let language = preference.resolve(locale.as_deref());
    tracing::debug!("language {language:?} (preference {preference:?}, locale {locale:?})");
    language
}

/// Label of a language option, written in the currently active language.
pub(crate) fn preference_label(active: Language, option: LanguagePreference) -> &'static str {
    match (active, option) {
        (Language::Chinese, LanguagePreference::System) => "跟随系统",
        (Language::English, LanguagePreference::System) => "System (auto)",
        (Language::Chinese, LanguagePreference::Chinese) => "中文",
        (Language::English, LanguagePreference::Chinese) => "Chinese",
        (Language::Chinese, LanguagePreference::English) => "英文",
        (Language::English, LanguagePreference::English) => "English",
    }
}
