use std::collections::HashMap;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::builtin;
use crate::rules::{Delimiter, LanguageRules};
use crate::tag::LanguageTag;

const NUMBER_PATTERN: &str = r"(?x)
    \b
    (?P<number>
        (?:
            0[xX][0-9A-Fa-f_]+ |
            0[bB][01_]+ |
            0[oO][0-7_]+ |
            [0-9][0-9_]*(\.[0-9_]+)?([eE][+-]?[0-9_]+)?
        )
    )
";

static DEFAULT_REGISTRY: Lazy<LanguageRegistry> = Lazy::new(LanguageRegistry::with_defaults);

/// Compiled highlighting rules for one [`LanguageTag`].
#[derive(Debug, Clone)]
pub struct LanguageDefinition {
    pub tag: LanguageTag,
    pub display_name: String,
    pub case_sensitive: bool,
    pub keywords: Vec<String>,

    keyword_regex: Option<Regex>,
    builtin_regex: Option<Regex>,
    operator_regex: Option<Regex>,
    number_regex: Regex,
    line_comments: Vec<String>,
    block_comment: Option<BlockComment>,
    string_delimiters: Vec<StringDelimiter>,
    additional_rules: Vec<PatternRule>,
}

impl LanguageDefinition {
    pub fn from_rules(tag: LanguageTag, rules: LanguageRules) -> Result<Self, HighlightError> {
        let keyword_regex = build_word_regex(&rules.keywords, rules.case_sensitive)?;
        let builtin_regex = build_word_regex(&rules.builtins, rules.case_sensitive)?;
        let operator_regex = build_operator_regex(&rules.operators)?;
        let number_regex = build_number_regex(rules.number_pattern.as_deref())?;
        let block_comment = rules
            .block_comment
            .clone()
            .map(|(start, end)| BlockComment { start, end });
        let mut string_delimiters: Vec<StringDelimiter> = rules
            .delimiters
            .iter()
            .map(|Delimiter { start, end, escape }| StringDelimiter {
                start: start.clone(),
                end: end.clone().unwrap_or_else(|| start.clone()),
                escape: *escape,
            })
            .collect();
        // Longer openers first so `"""` wins over `"` at the same offset.
        string_delimiters.sort_by(|a, b| b.start.len().cmp(&a.start.len()));
        let additional_rules = rules
            .patterns
            .iter()
            .map(|source| {
                Regex::new(&source.pattern)
                    .map(|regex| PatternRule {
                        regex,
                        kind: HighlightKind::from_name(&source.kind),
                    })
                    .map_err(|err| {
                        HighlightError::RegexCompilation(format!(
                            "pattern '{}': {err}",
                            source.pattern
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            tag,
            display_name: rules.name,
            case_sensitive: rules.case_sensitive,
            keywords: rules.keywords,
            keyword_regex,
            builtin_regex,
            operator_regex,
            number_regex,
            line_comments: rules.line_comments,
            block_comment,
            string_delimiters,
            additional_rules,
        })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Tokenizes `input`; returned ranges are byte offsets sorted by start.
    /// （將輸入切分為高亮片段，範圍為位元組位移並依起點排序。）
    pub fn highlight(&self, input: &str) -> Vec<HighlightToken> {
        let mut tokens = Vec::new();
        if input.is_empty() {
            return tokens;
        }
        let mut occupied = vec![false; input.len()];

        self.scan_comments_and_strings(input, &mut tokens, &mut occupied);

        if let Some(regex) = &self.keyword_regex {
            highlight_with_regex(
                regex,
                HighlightKind::Keyword,
                input,
                &mut tokens,
                &mut occupied,
            );
        }

        if let Some(regex) = &self.builtin_regex {
            highlight_with_regex(
                regex,
                HighlightKind::Custom("builtin".into()),
                input,
                &mut tokens,
                &mut occupied,
            );
        }

        for rule in &self.additional_rules {
            highlight_with_regex(
                &rule.regex,
                rule.kind.clone(),
                input,
                &mut tokens,
                &mut occupied,
            );
        }

        highlight_with_regex(
            &self.number_regex,
            HighlightKind::Number,
            input,
            &mut tokens,
            &mut occupied,
        );

        if let Some(regex) = &self.operator_regex {
            highlight_with_regex(
                regex,
                HighlightKind::Operator,
                input,
                &mut tokens,
                &mut occupied,
            );
        }

        tokens.sort_by_key(|token| token.range.start);
        tokens
    }

    /// Single left-to-right pass so that comment markers inside strings (and
    /// quotes inside comments) are not misread.
    fn scan_comments_and_strings(
        &self,
        input: &str,
        tokens: &mut Vec<HighlightToken>,
        occupied: &mut [bool],
    ) {
        let mut index = 0;
        while index < input.len() {
            let rest = &input[index..];
            let Some(opener) = self.next_opener(rest) else {
                break;
            };
            let start = index + opener.offset;
            let end = match opener.kind {
                Opener::Block(block) => {
                    let body = start + block.start.len();
                    input[body..]
                        .find(&block.end)
                        .map(|rel| body + rel + block.end.len())
                        .unwrap_or(input.len())
                }
                Opener::Line => input[start..]
                    .find('\n')
                    .map(|rel| start + rel)
                    .unwrap_or(input.len()),
                Opener::String(delimiter) => scan_string(delimiter, input, start),
            };
            let kind = match opener.kind {
                Opener::String(_) => HighlightKind::String,
                _ => HighlightKind::Comment,
            };
            mark_range(occupied, start..end);
            tokens.push(HighlightToken {
                range: start..end,
                kind,
            });
            index = end.max(start + 1);
            while index < input.len() && !input.is_char_boundary(index) {
                index += 1;
            }
        }
    }

    fn next_opener<'a>(&'a self, rest: &str) -> Option<FoundOpener<'a>> {
        let mut best: Option<FoundOpener<'a>> = None;
        let mut consider = |offset: usize, kind: Opener<'a>| {
            if best.as_ref().map_or(true, |current| offset < current.offset) {
                best = Some(FoundOpener { offset, kind });
            }
        };
        if let Some(block) = &self.block_comment {
            if let Some(offset) = rest.find(&block.start) {
                consider(offset, Opener::Block(block));
            }
        }
        for marker in self.line_comments.iter().filter(|m| !m.is_empty()) {
            if let Some(offset) = rest.find(marker.as_str()) {
                consider(offset, Opener::Line);
            }
        }
        for delimiter in &self.string_delimiters {
            if delimiter.start.is_empty() || delimiter.end.is_empty() {
                continue;
            }
            if let Some(offset) = rest.find(&delimiter.start) {
                consider(offset, Opener::String(delimiter));
            }
        }
        best
    }
}

#[derive(Debug, Clone)]
struct BlockComment {
    start: String,
    end: String,
}

#[derive(Debug, Clone)]
struct StringDelimiter {
    start: String,
    end: String,
    escape: Option<char>,
}

#[derive(Debug, Clone)]
struct PatternRule {
    regex: Regex,
    kind: HighlightKind,
}

enum Opener<'a> {
    Block(&'a BlockComment),
    Line,
    String(&'a StringDelimiter),
}

struct FoundOpener<'a> {
    offset: usize,
    kind: Opener<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Keyword,
    Comment,
    String,
    Number,
    Operator,
    Identifier,
    Custom(String),
}

impl HighlightKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "keyword" => HighlightKind::Keyword,
            "comment" => HighlightKind::Comment,
            "string" => HighlightKind::String,
            "number" => HighlightKind::Number,
            "operator" => HighlightKind::Operator,
            "identifier" => HighlightKind::Identifier,
            other => HighlightKind::Custom(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightToken {
    pub range: Range<usize>,
    pub kind: HighlightKind,
}

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),
    #[error("regex compilation failed: {0}")]
    RegexCompilation(String),
}

/// Lookup table from [`LanguageTag`] to compiled rules.
#[derive(Default)]
pub struct LanguageRegistry {
    languages: HashMap<LanguageTag, LanguageDefinition>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self {
            languages: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for tag in LanguageTag::ALL {
            let definition = LanguageDefinition::from_rules(tag, builtin::rules_for(tag))
                .expect("built-in language rules must compile");
            registry.register(definition);
        }
        registry
    }

    /// Shared registry holding every built-in language.
    pub fn shared() -> &'static LanguageRegistry {
        &DEFAULT_REGISTRY
    }

    pub fn register(&mut self, language: LanguageDefinition) {
        self.languages.insert(language.tag, language);
    }

    pub fn get(&self, tag: LanguageTag) -> Option<&LanguageDefinition> {
        self.languages.get(&tag)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn highlight(
        &self,
        tag: LanguageTag,
        input: &str,
    ) -> Result<Vec<HighlightToken>, HighlightError> {
        let language = self
            .get(tag)
            .ok_or_else(|| HighlightError::UnsupportedLanguage(tag.to_string()))?;
        Ok(language.highlight(input))
    }
}

fn scan_string(delimiter: &StringDelimiter, input: &str, start: usize) -> usize {
    let body = start + delimiter.start.len();
    let single_line = delimiter.start.chars().count() == 1;
    let mut chars = input[body..].char_indices();
    while let Some((rel, ch)) = chars.next() {
        let cursor = body + rel;
        if Some(ch) == delimiter.escape {
            chars.next();
            continue;
        }
        if input[cursor..].starts_with(&delimiter.end) {
            return cursor + delimiter.end.len();
        }
        if single_line && ch == '\n' {
            return cursor;
        }
    }
    input.len()
}

fn highlight_with_regex(
    regex: &Regex,
    kind: HighlightKind,
    input: &str,
    tokens: &mut Vec<HighlightToken>,
    occupied: &mut [bool],
) {
    for capture in regex.find_iter(input) {
        let range = capture.start()..capture.end();
        if range.is_empty()
            || range
                .clone()
                .any(|index| occupied.get(index).copied().unwrap_or(false))
        {
            continue;
        }
        mark_range(occupied, range.clone());
        tokens.push(HighlightToken {
            range,
            kind: kind.clone(),
        });
    }
}

fn mark_range(occupied: &mut [bool], range: Range<usize>) {
    let start = range.start.min(occupied.len());
    let end = range.end.min(occupied.len());
    for slot in &mut occupied[start..end] {
        *slot = true;
    }
}

fn build_word_regex(
    words: &[String],
    case_sensitive: bool,
) -> Result<Option<Regex>, HighlightError> {
    if words.is_empty() {
        return Ok(None);
    }
    let pattern = words
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"\b({pattern})\b");
    let mut builder = RegexBuilder::new(&pattern);
    builder.multi_line(true);
    if !case_sensitive {
        builder.case_insensitive(true);
    }
    builder.build().map(Some).map_err(|err| {
        HighlightError::RegexCompilation(format!("keyword regex compile error: {err}"))
    })
}

fn build_operator_regex(operators: &[String]) -> Result<Option<Regex>, HighlightError> {
    if operators.is_empty() {
        return Ok(None);
    }
    let mut sorted: Vec<&String> = operators.iter().collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()));
    let pattern = sorted
        .iter()
        .map(|operator| regex::escape(operator))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!("({pattern})");
    Regex::new(&pattern)
        .map(Some)
        .map_err(|err| HighlightError::RegexCompilation(format!("operator regex: {err}")))
}

fn build_number_regex(custom: Option<&str>) -> Result<Regex, HighlightError> {
    let pattern = custom.unwrap_or(NUMBER_PATTERN);
    Regex::new(pattern)
        .map_err(|err| HighlightError::RegexCompilation(format!("number regex: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_of<'a>(source: &'a str, tokens: &'a [HighlightToken]) -> Vec<(&'a str, HighlightKind)> {
        tokens
            .iter()
            .map(|token| (&source[token.range.clone()], token.kind.clone()))
            .collect()
    }

    #[test]
    fn every_tag_has_rules() {
        let registry = LanguageRegistry::with_defaults();
        assert_eq!(registry.len(), LanguageTag::ALL.len());
        for tag in LanguageTag::ALL {
            assert!(registry.get(tag).is_some(), "missing rules for {tag}");
        }
    }

    #[test]
    fn highlights_rust_keywords_and_comments() {
        let registry = LanguageRegistry::shared();
        let source = r#"
        fn main() {
            // comment
            let value = "text";
            /* block */
            42usize
        }
        "#;
        let tokens = registry.highlight(LanguageTag::Rust, source).unwrap();
        assert!(tokens
            .iter()
            .any(|token| token.kind == HighlightKind::Keyword));
        assert!(tokens
            .iter()
            .any(|token| token.kind == HighlightKind::Comment));
        assert!(tokens
            .iter()
            .any(|token| token.kind == HighlightKind::String));
        assert!(tokens
            .iter()
            .any(|token| token.kind == HighlightKind::Number));
    }

    #[test]
    fn comment_marker_inside_string_stays_string() {
        let source = "url = \"http://x#y\"  # trailing";
        let tokens = LanguageRegistry::shared()
            .highlight(LanguageTag::Python, source)
            .unwrap();
        let found = kinds_of(source, &tokens);
        assert!(found.contains(&("\"http://x#y\"", HighlightKind::String)));
        assert!(found.contains(&("# trailing", HighlightKind::Comment)));
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let source = r#"s = "a\"b" + 1"#;
        let tokens = LanguageRegistry::shared()
            .highlight(LanguageTag::Javascript, source)
            .unwrap();
        let found = kinds_of(source, &tokens);
        assert!(found.contains(&(r#""a\"b""#, HighlightKind::String)));
        assert!(found.contains(&("1", HighlightKind::Number)));
    }

    #[test]
    fn unterminated_quote_stops_at_line_end() {
        let source = "x = 'oops\nwhile True: pass";
        let tokens = LanguageRegistry::shared()
            .highlight(LanguageTag::Python, source)
            .unwrap();
        let found = kinds_of(source, &tokens);
        assert!(found.contains(&("'oops", HighlightKind::String)));
        assert!(found.contains(&("while", HighlightKind::Keyword)));
    }

    #[test]
    fn python_triple_quoted_string_spans_lines() {
        let source = "doc = \"\"\"line one\nline two\"\"\"\nx = 1";
        let tokens = LanguageRegistry::shared()
            .highlight(LanguageTag::Python, source)
            .unwrap();
        let string = tokens
            .iter()
            .find(|token| token.kind == HighlightKind::String)
            .unwrap();
        assert_eq!(&source[string.range.clone()], "\"\"\"line one\nline two\"\"\"");
    }

    #[test]
    fn sql_keywords_are_case_insensitive() {
        let source = "select id FROM users";
        let tokens = LanguageRegistry::shared()
            .highlight(LanguageTag::Sql, source)
            .unwrap();
        let keywords: Vec<_> = kinds_of(source, &tokens)
            .into_iter()
            .filter(|(_, kind)| *kind == HighlightKind::Keyword)
            .map(|(text, _)| text)
            .collect();
        assert_eq!(keywords, vec!["select", "FROM"]);
    }

    #[test]
    fn digits_inside_identifiers_are_not_numbers() {
        let source = "value2 = 3";
        let tokens = LanguageRegistry::shared()
            .highlight(LanguageTag::Python, source)
            .unwrap();
        let numbers: Vec<_> = kinds_of(source, &tokens)
            .into_iter()
            .filter(|(_, kind)| *kind == HighlightKind::Number)
            .map(|(text, _)| text)
            .collect();
        assert_eq!(numbers, vec!["3"]);
    }

    #[test]
    fn multibyte_text_does_not_split_characters() {
        let source = "# 註解\nprint(\"héllo wörld\")";
        let tokens = LanguageRegistry::shared()
            .highlight(LanguageTag::Python, source)
            .unwrap();
        for token in &tokens {
            assert!(source.is_char_boundary(token.range.start));
            assert!(source.is_char_boundary(token.range.end));
        }
    }

    #[test]
    fn named_lookup_rejects_unknown_language() {
        let err = "cobol".parse::<LanguageTag>().unwrap_err();
        assert!(matches!(err, HighlightError::UnsupportedLanguage(_)));
        let tag: LanguageTag = "go".parse().unwrap();
        assert!(LanguageRegistry::shared().highlight(tag, "package main").is_ok());
    }
}
