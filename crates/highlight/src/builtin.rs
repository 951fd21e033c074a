//! Rule table for every [`LanguageTag`].
//! （每種語言標記對應的內建規則表。）

use crate::rules::LanguageRules;
use crate::tag::LanguageTag;

const C_OPERATORS: &[&str] = &[
    "->", "++", "--", "==", "!=", ">=", "<=", "&&", "||", "<<", ">>", "+=", "-=", "*=", "/=",
    "%=", "+", "-", "*", "/", "%", "=", ">", "<", "!", "&", "|", "^", "~", "?", ":",
];

pub fn rules_for(tag: LanguageTag) -> LanguageRules {
    match tag {
        LanguageTag::Python => python(),
        LanguageTag::Matlab => matlab(),
        LanguageTag::Bash => bash(),
        LanguageTag::Java => java(),
        LanguageTag::Javascript => javascript(),
        LanguageTag::Html => html(),
        LanguageTag::Css => css(),
        LanguageTag::C => c(),
        LanguageTag::Cpp => cpp(),
        LanguageTag::Csharp => csharp(),
        LanguageTag::Php => php(),
        LanguageTag::Ruby => ruby(),
        LanguageTag::Swift => swift(),
        LanguageTag::Kotlin => kotlin(),
        LanguageTag::Go => go(),
        LanguageTag::Rust => rust(),
        LanguageTag::R => r(),
        LanguageTag::Sql => sql(),
        LanguageTag::Powershell => powershell(),
    }
}

fn c_family(name: &str) -> LanguageRules {
    LanguageRules::new(name)
        .line_comment("//")
        .block_comment("/*", "*/")
        .string("\"", Some('\\'))
        .string("'", Some('\\'))
        .operators(C_OPERATORS)
}

fn python() -> LanguageRules {
    LanguageRules::new("Python")
        .keywords(&[
            "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
            "continue", "def", "del", "elif", "else", "except", "finally", "for", "from",
            "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass",
            "raise", "return", "try", "while", "with", "yield",
        ])
        .builtins(&[
            "print", "len", "range", "open", "int", "str", "float", "list", "dict", "set",
            "tuple", "enumerate", "zip", "map", "filter", "sorted", "isinstance", "super", "self",
        ])
        .line_comment("#")
        .string("\"\"\"", Some('\\'))
        .string("'''", Some('\\'))
        .string("\"", Some('\\'))
        .string("'", Some('\\'))
        .operators(&[
            "**", "//", "==", "!=", ">=", "<=", "->", "+=", "-=", "*=", "/=", "+", "-", "*", "/",
            "%", "=", ">", "<", "&", "|", "^", "~", "@",
        ])
        .pattern(r"(?m)^\s*@[A-Za-z_][A-Za-z0-9_.]*", "decorator")
}

fn matlab() -> LanguageRules {
    LanguageRules::new("MATLAB")
        .keywords(&[
            "break", "case", "catch", "classdef", "continue", "else", "elseif", "end", "for",
            "function", "global", "if", "otherwise", "parfor", "persistent", "return", "spmd",
            "switch", "try", "while",
        ])
        .builtins(&[
            "disp", "zeros", "ones", "size", "length", "plot", "fprintf", "sprintf", "numel",
            "linspace", "eye", "rand", "sum", "max", "min",
        ])
        .block_comment("%{", "%}")
        .line_comment("%")
        .string("\"", None)
        .operators(&[
            ".*", "./", ".^", ".'", "==", "~=", ">=", "<=", "&&", "||", "+", "-", "*", "/", "\\",
            "^", "=", ">", "<", "&", "|", "~", ":",
        ])
}

fn bash() -> LanguageRules {
    LanguageRules::new("Bash")
        .keywords(&[
            "if", "then", "else", "elif", "fi", "case", "esac", "for", "select", "while",
            "until", "do", "done", "in", "function", "time", "return", "exit", "local", "export",
        ])
        .builtins(&[
            "echo", "cd", "pwd", "read", "printf", "source", "set", "unset", "shift", "test",
            "eval", "exec", "trap",
        ])
        .line_comment("#")
        .string("\"", Some('\\'))
        .string("'", None)
        .operators(&["&&", "||", ";;", "|", "&", ">>", ">", "<", "=", "!"])
        .pattern(r"\$\{?[A-Za-z_][A-Za-z0-9_]*\}?|\$[0-9@#?$!*-]", "variable")
}

fn java() -> LanguageRules {
    c_family("Java")
        .keywords(&[
            "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
            "const", "continue", "default", "do", "double", "else", "enum", "extends", "final",
            "finally", "float", "for", "if", "implements", "import", "instanceof", "int",
            "interface", "long", "native", "new", "package", "private", "protected", "public",
            "return", "short", "static", "super", "switch", "synchronized", "this", "throw",
            "throws", "try", "void", "volatile", "while", "true", "false", "null", "var",
            "record",
        ])
        .builtins(&["String", "System", "Object", "Integer", "List", "Map", "Math"])
        .pattern(r"@[A-Za-z_][A-Za-z0-9_]*", "decorator")
}

fn javascript() -> LanguageRules {
    c_family("JavaScript")
        .keywords(&[
            "async", "await", "break", "case", "catch", "class", "const", "continue",
            "debugger", "default", "delete", "do", "else", "export", "extends", "finally", "for",
            "from", "function", "if", "import", "in", "instanceof", "let", "new", "of",
            "return", "static", "super", "switch", "this", "throw", "try", "typeof", "var",
            "void", "while", "yield", "true", "false", "null", "undefined",
        ])
        .builtins(&[
            "console", "document", "window", "Math", "JSON", "Promise", "Array", "Object",
            "String", "Number",
        ])
        .string("`", Some('\\'))
        .operators(&["===", "!==", "=>", "**", "??", "?."])
}

fn html() -> LanguageRules {
    LanguageRules::new("HTML")
        .block_comment("<!--", "-->")
        .string("\"", None)
        .string("'", None)
        .pattern(r"</?[A-Za-z][A-Za-z0-9-]*|/?>", "tag")
        .pattern(r"\b[A-Za-z-]+=", "attribute")
        .pattern(r"&[A-Za-z0-9#]+;", "entity")
        .case_insensitive()
}

fn css() -> LanguageRules {
    LanguageRules::new("CSS")
        .keywords(&["important", "media", "import", "keyframes", "font-face", "supports"])
        .block_comment("/*", "*/")
        .string("\"", Some('\\'))
        .string("'", Some('\\'))
        .pattern(r"#[0-9A-Fa-f]{3,8}\b", "number")
        .pattern(r"[A-Za-z-]+\s*:", "attribute")
        .pattern(r"[.#][A-Za-z_][A-Za-z0-9_-]*", "tag")
        .number_pattern(r"-?\b[0-9]+(\.[0-9]+)?(px|em|rem|%|vh|vw|s|ms|pt|deg)?")
        .operators(&["{", "}", ";", ",", ">", "+", "~"])
}

fn c() -> LanguageRules {
    c_family("C")
        .keywords(&[
            "auto", "break", "case", "char", "const", "continue", "default", "do", "double",
            "else", "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long",
            "register", "restrict", "return", "short", "signed", "sizeof", "static", "struct",
            "switch", "typedef", "union", "unsigned", "void", "volatile", "while", "NULL",
        ])
        .builtins(&["printf", "scanf", "malloc", "free", "memcpy", "strlen", "size_t"])
        .pattern(r"(?m)^\s*#\s*[a-z]+", "preprocessor")
}

fn cpp() -> LanguageRules {
    c_family("C++")
        .keywords(&[
            "alignas", "auto", "bool", "break", "case", "catch", "char", "class", "const",
            "constexpr", "continue", "decltype", "default", "delete", "do", "double", "else",
            "enum", "explicit", "extern", "false", "float", "for", "friend", "goto", "if",
            "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "nullptr",
            "operator", "private", "protected", "public", "return", "short", "signed", "sizeof",
            "static", "struct", "switch", "template", "this", "throw", "true", "try", "typedef",
            "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "while",
        ])
        .builtins(&["std", "cout", "cin", "endl", "string", "vector", "map", "size_t"])
        .operators(&["::"])
        .pattern(r"(?m)^\s*#\s*[a-z]+", "preprocessor")
}

fn csharp() -> LanguageRules {
    c_family("C#")
        .keywords(&[
            "abstract", "as", "async", "await", "base", "bool", "break", "case", "catch",
            "class", "const", "continue", "decimal", "default", "delegate", "do", "double",
            "else", "enum", "event", "false", "finally", "float", "for", "foreach", "get", "if",
            "in", "int", "interface", "internal", "is", "lock", "long", "namespace", "new",
            "null", "object", "out", "override", "private", "protected", "public", "readonly",
            "ref", "return", "sealed", "set", "static", "string", "struct", "switch", "this",
            "throw", "true", "try", "using", "var", "virtual", "void", "while",
        ])
        .builtins(&["Console", "Math", "List", "Dictionary", "Task", "String"])
        .operators(&["=>", "??", "?."])
}

fn php() -> LanguageRules {
    c_family("PHP")
        .line_comment("#")
        .keywords(&[
            "abstract", "and", "array", "as", "break", "case", "catch", "class", "const",
            "continue", "declare", "default", "do", "echo", "else", "elseif", "extends",
            "final", "finally", "fn", "for", "foreach", "function", "global", "if",
            "implements", "include", "interface", "match", "namespace", "new", "or", "print",
            "private", "protected", "public", "require", "return", "static", "switch", "throw",
            "trait", "try", "use", "while", "true", "false", "null",
        ])
        .builtins(&["strlen", "count", "isset", "empty", "array_map", "implode", "explode"])
        .operators(&["=>", ".=", "===", "!=="])
        .pattern(r"\$[A-Za-z_][A-Za-z0-9_]*", "variable")
        .pattern(r"<\?php|\?>", "tag")
        .case_insensitive()
}

fn ruby() -> LanguageRules {
    LanguageRules::new("Ruby")
        .keywords(&[
            "alias", "and", "begin", "break", "case", "class", "def", "do", "else",
            "elsif", "end", "ensure", "false", "for", "if", "in", "module", "next", "nil", "not",
            "or", "redo", "rescue", "retry", "return", "self", "super", "then", "true", "undef",
            "unless", "until", "when", "while", "yield",
        ])
        .builtins(&["puts", "print", "require", "attr_accessor", "attr_reader", "lambda"])
        .block_comment("=begin", "=end")
        .line_comment("#")
        .string("\"", Some('\\'))
        .string("'", Some('\\'))
        .operators(&[
            "**", "==", "!=", ">=", "<=", "<=>", "&&", "||", "<<", "+=", "-=", "+", "-", "*",
            "/", "%", "=", ">", "<", "!",
        ])
        .pattern(r":[A-Za-z_][A-Za-z0-9_]*", "symbol")
        .pattern(r"@{1,2}[A-Za-z_][A-Za-z0-9_]*", "variable")
}

fn swift() -> LanguageRules {
    c_family("Swift")
        .keywords(&[
            "associatedtype", "break", "case", "catch", "class", "continue", "default", "defer",
            "deinit", "do", "else", "enum", "extension", "fallthrough", "false", "for", "func",
            "guard", "if", "import", "in", "init", "inout", "internal", "is", "let", "nil",
            "operator", "private", "protocol", "public", "repeat", "return", "self", "static",
            "struct", "subscript", "super", "switch", "throw", "throws", "true", "try", "var",
            "where", "while",
        ])
        .builtins(&["print", "String", "Int", "Double", "Bool", "Array", "Dictionary"])
        .string("\"\"\"", Some('\\'))
        .operators(&["...", "..<", "??", "?."])
        .pattern(r"@[A-Za-z_][A-Za-z0-9_]*", "decorator")
}

fn kotlin() -> LanguageRules {
    c_family("Kotlin")
        .keywords(&[
            "as", "break", "class", "companion", "continue", "data", "do", "else", "enum",
            "false", "for", "fun", "if", "import", "in", "interface", "is", "lateinit", "null",
            "object", "open", "override", "package", "private", "protected", "public", "return",
            "sealed", "super", "suspend", "this", "throw", "true", "try", "val", "var", "when",
            "while",
        ])
        .builtins(&["println", "print", "listOf", "mapOf", "setOf", "String", "Int"])
        .string("\"\"\"", None)
        .operators(&["?:", "?.", "!!", "..", "=>"])
        .pattern(r"@[A-Za-z_][A-Za-z0-9_]*", "decorator")
}

fn go() -> LanguageRules {
    c_family("Go")
        .keywords(&[
            "break", "case", "chan", "const", "continue", "default", "defer", "else",
            "fallthrough", "for", "func", "go", "goto", "if", "import", "interface", "map",
            "package", "range", "return", "select", "struct", "switch", "type", "var", "true",
            "false", "nil", "iota",
        ])
        .builtins(&[
            "append", "cap", "close", "copy", "delete", "len", "make", "new", "panic", "print",
            "println", "recover", "string", "int", "error", "bool", "byte",
        ])
        .string("`", None)
        .operators(&[":=", "<-", "..."])
}

fn rust() -> LanguageRules {
    LanguageRules::new("Rust")
        .keywords(&[
            "fn", "let", "mut", "pub", "impl", "trait", "struct", "enum", "match", "if", "else",
            "loop", "while", "for", "in", "move", "async", "await", "use", "crate", "mod",
            "const", "static", "where", "return", "break", "continue", "Self", "self", "ref",
            "type", "unsafe", "extern", "dyn", "true", "false", "as", "super",
        ])
        .builtins(&[
            "Option", "Some", "None", "Result", "Ok", "Err", "Vec", "String", "Box", "println",
            "format", "vec", "panic",
        ])
        .line_comment("//")
        .block_comment("/*", "*/")
        .string("\"", Some('\\'))
        .operators(&[
            "::", "->", "=>", "==", "!=", ">=", "<=", "+=", "-=", "*=", "/=", "%=", "&&", "||",
            "+", "-", "*", "/", "%", ">", "<", "&", "|", "^", "!", "?", "=",
        ])
        .pattern(r"'[A-Za-z_][A-Za-z0-9_]*\b", "lifetime")
        .pattern(r"#!?\[[^\]]*\]", "decorator")
}

fn r() -> LanguageRules {
    LanguageRules::new("R")
        .keywords(&[
            "if", "else", "repeat", "while", "function", "for", "in", "next", "break", "TRUE",
            "FALSE", "NULL", "Inf", "NaN", "NA", "return",
        ])
        .builtins(&[
            "c", "library", "print", "paste", "cat", "data.frame", "list", "length", "mean",
            "sum", "apply", "sapply", "lapply",
        ])
        .line_comment("#")
        .string("\"", Some('\\'))
        .string("'", Some('\\'))
        .operators(&[
            "<-", "->", "<<-", "%%", "%in%", "%>%", "|>", "==", "!=", ">=", "<=", "&&", "||",
            "+", "-", "*", "/", "^", "=", ">", "<", "!", "&", "|", "~", "$", ":",
        ])
}

fn sql() -> LanguageRules {
    LanguageRules::new("SQL")
        .keywords(&[
            "select", "from", "where", "insert", "into", "values", "update", "set", "delete",
            "create", "table", "drop", "alter", "add", "index", "view", "join", "inner", "left",
            "right", "outer", "on", "group", "by", "order", "having", "limit", "offset", "and",
            "or", "not", "null", "is", "in", "as", "distinct", "union", "all", "case", "when",
            "then", "else", "end", "primary", "key", "foreign", "references", "exists", "like",
            "between", "asc", "desc",
        ])
        .builtins(&[
            "count", "sum", "avg", "min", "max", "coalesce", "upper", "lower", "now", "varchar",
            "integer", "text", "date",
        ])
        .line_comment("--")
        .block_comment("/*", "*/")
        .string("'", None)
        .string("\"", None)
        .operators(&["<>", "!=", ">=", "<=", "||", "=", ">", "<", "+", "-", "*", "/", "%"])
        .case_insensitive()
}

fn powershell() -> LanguageRules {
    LanguageRules::new("PowerShell")
        .keywords(&[
            "begin", "break", "catch", "class", "continue", "data", "do", "dynamicparam",
            "else", "elseif", "end", "exit", "filter", "finally", "for", "foreach", "from",
            "function", "if", "in", "param", "process", "return", "switch", "throw", "trap",
            "try", "until", "using", "while",
        ])
        .builtins(&[
            "Write-Host", "Write-Output", "Get-Item", "Get-ChildItem", "Set-Location",
            "Get-Content", "Set-Content", "New-Object", "Where-Object", "ForEach-Object",
        ])
        .block_comment("<#", "#>")
        .line_comment("#")
        .string("\"", Some('`'))
        .string("'", None)
        .operators(&["|", "=", "+", "-", "*", "/", "%", ">", "<", "!"])
        .pattern(r"\$[A-Za-z_][A-Za-z0-9_:]*", "variable")
        .pattern(
            r"(?i)-(eq|ne|gt|ge|lt|le|like|notlike|match|notmatch|and|or|not|contains)\b",
            "operator",
        )
        .case_insensitive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_names_match_display_names() {
        for tag in LanguageTag::ALL {
            assert_eq!(rules_for(tag).name, tag.display_name());
        }
    }
}
