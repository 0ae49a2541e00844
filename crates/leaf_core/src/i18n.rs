//! User-facing text in the two supported languages.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    Chinese,
    #[default]
    English,
}

impl Language {
    pub fn tr(self, zh: &'static str, en: &'static str) -> &'static str {
        match self {
            Language::Chinese => zh,
            Language::English => en,
        }
    }

    /// Map a BCP-47 locale such as `zh-CN` or `en_US.UTF-8`.
    pub fn from_locale(locale: &str) -> Self {
        if locale.to_ascii_lowercase().starts_with("zh") {
            Language::Chinese
        } else {
            Language::English
        }
    }
}

/// Language choice as stored in the configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguagePreference {
    #[default]
    System,
    Chinese,
    English,
}

impl LanguagePreference {
    pub fn resolve(self, system_locale: Option<&str>) -> Language {
        match self {
            LanguagePreference::Chinese => Language::Chinese,
            LanguagePreference::English => Language::English,
            LanguagePreference::System => system_locale
                .map(Language::from_locale)
                .unwrap_or_default(),
        }
    }
}

/// Fixed messages shown by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    NotAnImage,
    UnreadableFile,
    DiagnosisFailed,
    NetworkError,
    ServiceUnhealthy,
    ServiceUnreachable,
    LeafHealthy,
    DiseaseDetected,
}

impl Message {
    pub fn text(self, lang: Language) -> &'static str {
        match self {
            Message::NotAnImage => lang.tr("请选择叶片图片文件", "Please choose a leaf image file"),
            Message::UnreadableFile => lang.tr("无法读取所选文件", "The selected file could not be read"),
            Message::DiagnosisFailed => lang.tr("病害诊断失败", "Diagnosis failed"),
            Message::NetworkError => lang.tr("网络错误", "Network error"),
            Message::ServiceUnhealthy => lang.tr("服务状态异常", "The diagnosis service reports a problem"),
            Message::ServiceUnreachable => {
                lang.tr("无法连接到病害诊断服务", "Cannot connect to the diagnosis service")
            }
            Message::LeafHealthy => lang.tr("叶片健康", "Leaf is healthy"),
            Message::DiseaseDetected => lang.tr("发现病害", "Disease detected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LanguagePreference::System, Some("zh-CN"), Language::Chinese)]
    #[case(LanguagePreference::System, Some("zh_TW.UTF-8"), Language::Chinese)]
    #[case(LanguagePreference::System, Some("en-GB"), Language::English)]
    #[case(LanguagePreference::System, Some("nl-NL"), Language::English)]
    #[case(LanguagePreference::System, None, Language::English)]
    #[case(LanguagePreference::Chinese, Some("en-US"), Language::Chinese)]
    #[case(LanguagePreference::English, Some("zh-CN"), Language::English)]
    fn preference_resolution(
        #[case] pref: LanguagePreference,
        #[case] locale: Option<&str>,
        #[case] expected: Language,
    ) {
        assert_eq!(pref.resolve(locale), expected);
    }

    #[test]
    fn messages_follow_language() {
        assert_eq!(Message::DiagnosisFailed.text(Language::Chinese), "病害诊断失败");
        assert_eq!(Message::DiagnosisFailed.text(Language::English), "Diagnosis failed");
    }
}
