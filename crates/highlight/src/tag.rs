use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::language::HighlightError;

/// Closed set of languages a cell may be tagged with.
/// （儲存格可標記的語言清單，為封閉集合。）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    Python,
    Matlab,
    Bash,
    Java,
    Javascript,
    Html,
    Css,
    C,
    Cpp,
    Csharp,
    Php,
    Ruby,
    Swift,
    Kotlin,
    Go,
    Rust,
    R,
    Sql,
    Powershell,
}

impl LanguageTag {
    /// Every supported tag, in the order the editor lists them.
    pub const ALL: [LanguageTag; 19] = [
        LanguageTag::Python,
        LanguageTag::Matlab,
        LanguageTag::Bash,
        LanguageTag::Java,
        LanguageTag::Javascript,
        LanguageTag::Html,
        LanguageTag::Css,
        LanguageTag::C,
        LanguageTag::Cpp,
        LanguageTag::Csharp,
        LanguageTag::Php,
        LanguageTag::Ruby,
        LanguageTag::Swift,
        LanguageTag::Kotlin,
        LanguageTag::Go,
        LanguageTag::Rust,
        LanguageTag::R,
        LanguageTag::Sql,
        LanguageTag::Powershell,
    ];

    /// Tag used for freshly added cells.
    pub const DEFAULT: LanguageTag = LanguageTag::Python;

    /// The persisted, lowercase tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            LanguageTag::Python => "python",
            LanguageTag::Matlab => "matlab",
            LanguageTag::Bash => "bash",
            LanguageTag::Java => "java",
            LanguageTag::Javascript => "javascript",
            LanguageTag::Html => "html",
            LanguageTag::Css => "css",
            LanguageTag::C => "c",
            LanguageTag::Cpp => "cpp",
            LanguageTag::Csharp => "csharp",
            LanguageTag::Php => "php",
            LanguageTag::Ruby => "ruby",
            LanguageTag::Swift => "swift",
            LanguageTag::Kotlin => "kotlin",
            LanguageTag::Go => "go",
            LanguageTag::Rust => "rust",
            LanguageTag::R => "r",
            LanguageTag::Sql => "sql",
            LanguageTag::Powershell => "powershell",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            LanguageTag::Python => "Python",
            LanguageTag::Matlab => "MATLAB",
            LanguageTag::Bash => "Bash",
            LanguageTag::Java => "Java",
            LanguageTag::Javascript => "JavaScript",
            LanguageTag::Html => "HTML",
            LanguageTag::Css => "CSS",
            LanguageTag::C => "C",
            LanguageTag::Cpp => "C++",
            LanguageTag::Csharp => "C#",
            LanguageTag::Php => "PHP",
            LanguageTag::Ruby => "Ruby",
            LanguageTag::Swift => "Swift",
            LanguageTag::Kotlin => "Kotlin",
            LanguageTag::Go => "Go",
            LanguageTag::Rust => "Rust",
            LanguageTag::R => "R",
            LanguageTag::Sql => "SQL",
            LanguageTag::Powershell => "PowerShell",
        }
    }
}

impl Default for LanguageTag {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageTag {
    type Err = HighlightError;

    /// Parses a persisted tag. Matching is exact apart from surrounding whitespace and case.
    /// （解析儲存的語言標記；僅忽略前後空白與大小寫。）
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        LanguageTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| HighlightError::UnsupportedLanguage(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_listed_tag() {
        for tag in LanguageTag::ALL {
            assert_eq!(tag.as_str().parse::<LanguageTag>().unwrap(), tag);
        }
        assert_eq!(" Rust ".parse::<LanguageTag>().unwrap(), LanguageTag::Rust);
    }

    #[test]
    fn rejects_unknown_tags() {
        let err = "brainfuck".parse::<LanguageTag>().unwrap_err();
        assert!(matches!(err, HighlightError::UnsupportedLanguage(tag) if tag == "brainfuck"));
    }

    #[test]
    fn serializes_as_lowercase_string() {
        let json = serde_json::to_string(&LanguageTag::Csharp).unwrap();
        assert_eq!(json, "\"csharp\"");
    }
}
