use serde::{Deserialize, Serialize};

/// Declarative highlighting rules for one language.
/// （單一語言的宣告式高亮規則。）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRules {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub builtins: Vec<String>,
    #[serde(default)]
    pub line_comments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_comment: Option<(String, String)>,
    #[serde(default)]
    pub delimiters: Vec<Delimiter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_pattern: Option<String>,
    #[serde(default)]
    pub operators: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<PatternSource>,
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
}

fn default_case_sensitive() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiter {
    pub start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(with = "serde_char_option")]
    pub escape: Option<char>,
}

/// Extra regex rule, applied after the standard token classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSource {
    pub pattern: String,
    pub kind: String,
}

mod serde_char_option {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<char>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(char) => serializer.serialize_some(&char.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<char>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let option = Option::<String>::deserialize(deserializer)?;
        Ok(option.and_then(|value| value.chars().next()))
    }
}

impl LanguageRules {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keywords: Vec::new(),
            builtins: Vec::new(),
            line_comments: Vec::new(),
            block_comment: None,
            delimiters: Vec::new(),
            number_pattern: None,
            operators: Vec::new(),
            patterns: Vec::new(),
            case_sensitive: true,
        }
    }

    pub fn keywords(mut self, words: &[&str]) -> Self {
        self.keywords.extend(words.iter().map(|word| word.to_string()));
        self
    }

    pub fn builtins(mut self, words: &[&str]) -> Self {
        self.builtins.extend(words.iter().map(|word| word.to_string()));
        self
    }

    pub fn line_comment(mut self, marker: &str) -> Self {
        self.line_comments.push(marker.to_string());
        self
    }

    pub fn block_comment(mut self, start: &str, end: &str) -> Self {
        self.block_comment = Some((start.to_string(), end.to_string()));
        self
    }

    /// Adds a string delimiter that opens and closes with the same token.
    pub fn string(mut self, quote: &str, escape: Option<char>) -> Self {
        self.delimiters.push(Delimiter {
            start: quote.to_string(),
            end: None,
            escape,
        });
        self
    }

    pub fn operators(mut self, operators: &[&str]) -> Self {
        self.operators
            .extend(operators.iter().map(|operator| operator.to_string()));
        self
    }

    pub fn pattern(mut self, pattern: &str, kind: &str) -> Self {
        self.patterns.push(PatternSource {
            pattern: pattern.to_string(),
            kind: kind.to_string(),
        });
        self
    }

    pub fn number_pattern(mut self, pattern: &str) -> Self {
        self.number_pattern = Some(pattern.to_string());
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_rules() {
        let rules = LanguageRules::new("Toy")
            .keywords(&["let", "in"])
            .line_comment("#")
            .line_comment("--")
            .string("\"", Some('\\'))
            .case_insensitive();
        assert_eq!(rules.keywords, vec!["let".to_string(), "in".to_string()]);
        assert_eq!(rules.line_comments.len(), 2);
        assert_eq!(rules.delimiters[0].escape, Some('\\'));
        assert!(!rules.case_sensitive);
    }

    #[test]
    fn rules_serialize_with_escape_as_string() {
        let rules = LanguageRules::new("Toy").string("'", Some('\\'));
        let json = serde_json::to_value(&rules).unwrap();
        assert_eq!(json["delimiters"][0]["escape"], "\\");
        let back: LanguageRules = serde_json::from_value(json).unwrap();
        assert_eq!(back, rules);
    }
}
