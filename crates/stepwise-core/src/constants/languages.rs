// ABOUTME: Languages offered on the language selection screen
// ABOUTME: Code, native name, and flag for each supported language
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

/// Language used when the user has not chosen one
pub const DEFAULT_LANGUAGE: &str = "en";

/// A selectable interface language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO 639-1 code
    pub code: &'static str,
    /// Name in the language itself
    pub name: &'static str,
    /// Flag emoji shown next to the name
    pub flag: &'static str,
}

/// Languages in display order
pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English", flag: "🇺🇸" },
    Language { code: "es", name: "Español", flag: "🇪🇸" },
    Language { code: "fr", name: "Français", flag: "🇫🇷" },
    Language { code: "zh", name: "中文", flag: "🇨🇳" },
    Language { code: "ar", name: "العربية", flag: "🇸🇦" },
    Language { code: "hi", name: "हिन्दी", flag: "🇮🇳" },
    Language { code: "pt", name: "Português", flag: "🇧🇷" },
];

/// Look up a supported language by code
#[must_use]
pub fn find_language(code: &str) -> Option<&'static Language> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|language| language.code.eq_ignore_ascii_case(code))
}
