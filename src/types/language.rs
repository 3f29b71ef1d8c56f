//! Target languages and request modes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Languages offered for chat replies and translation.
///
/// The wire code is the English name, which is what the generation server
/// interpolates into its prompt.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Language {
    #[default]
    Korean,
    English,
    Japanese,
    Chinese,
    French,
    German,
    Spanish,
    Russian,
}

impl Language {
    /// Wire code sent to the server.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Korean => "Korean",
            Self::English => "English",
            Self::Japanese => "Japanese",
            Self::Chinese => "Chinese",
            Self::French => "French",
            Self::German => "German",
            Self::Spanish => "Spanish",
            Self::Russian => "Russian",
        }
    }

    /// Name of the language in that language.
    pub fn native_name(&self) -> &'static str {
        match self {
            Self::Korean => "한국어",
            Self::English => "English",
            Self::Japanese => "日本語",
            Self::Chinese => "中文",
            Self::French => "Français",
            Self::German => "Deutsch",
            Self::Spanish => "Español",
            Self::Russian => "Русский",
        }
    }

    pub fn all() -> impl Iterator<Item = Language> {
        Self::iter()
    }
}

/// Which server endpoint (and request body shape) an exchange uses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChatMode {
    #[default]
    Chat,
    Translate,
}

impl ChatMode {
    /// Streaming endpoint path for this mode.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Chat => "/api/chat/stream-sse",
            Self::Translate => "/api/translate/stream-sse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("japanese".parse::<Language>().unwrap(), Language::Japanese);
        assert_eq!("FRENCH".parse::<Language>().unwrap(), Language::French);
        assert!("Klingon".parse::<Language>().is_err());
    }

    #[test]
    fn code_matches_display() {
        for lang in Language::all() {
            assert_eq!(lang.code(), lang.to_string());
        }
        assert_eq!(Language::all().count(), 8);
    }

    #[test]
    fn mode_paths() {
        assert_eq!("translate".parse::<ChatMode>().unwrap(), ChatMode::Translate);
        assert_eq!(ChatMode::Chat.path(), "/api/chat/stream-sse");
    }
}
