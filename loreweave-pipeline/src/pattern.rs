//! Find-pattern preparation: macro token substitution, `/source/flags`
//! parsing, and compilation.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use loreweave_core::models::MacroMode;

static TOKEN_BRACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([a-zA-Z0-9_]+)\s*\}\}").unwrap());
static TOKEN_ANGLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<\s*([a-zA-Z0-9_]+)\s*>>").unwrap());

/// Escape regex metacharacters so a value matches only literally.
pub fn escape_regex_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']'
            | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn resolve_key<'a>(macros: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    if let Some(v) = macros.get(key) {
        return Some(v);
    }
    macros.get(&key.to_lowercase()).map(String::as_str)
}

/// Substitute plain macro tokens inside a find pattern per the rule's
/// macro mode. Variable macros (`{{getvar::...}}`) never match the token
/// shape, so they are left alone by construction.
pub fn substitute_macro_tokens(
    pattern: &str,
    macros: &HashMap<String, String>,
    mode: MacroMode,
) -> String {
    if mode == MacroMode::None {
        return pattern.to_string();
    }

    let replace = |caps: &Captures<'_>| -> String {
        match resolve_key(macros, &caps[1]) {
            Some(v) if mode == MacroMode::Escaped => escape_regex_literal(v),
            Some(v) => v.to_string(),
            None => caps[0].to_string(),
        }
    };

    let out = TOKEN_BRACES.replace_all(pattern, replace).into_owned();
    TOKEN_ANGLES.replace_all(&out, replace).into_owned()
}

/// A parsed find pattern, ready to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    pub source: String,
    /// `g`: rewrite every match instead of the first only.
    pub global: bool,
    /// `y`: the pattern must match at the start of the subject.
    pub sticky: bool,
    /// Inline-flag prefix derived from `i`/`m`/`s`.
    inline: String,
}

/// Split a `/source/flags` literal at the last unescaped slash; anything
/// else (or an unknown flag letter) is a bare source with no flags.
pub fn parse_find_pattern(input: &str) -> ParsedPattern {
    if let Some(rest) = input.strip_prefix('/') {
        let chars: Vec<char> = rest.chars().collect();
        for i in (0..chars.len()).rev() {
            if chars[i] != '/' {
                continue;
            }
            let mut backslashes = 0;
            let mut j = i;
            while j > 0 && chars[j - 1] == '\\' {
                backslashes += 1;
                j -= 1;
            }
            if backslashes % 2 == 1 {
                continue;
            }

            let source: String = chars[..i].iter().collect();
            let flags: String = chars[i + 1..].iter().collect();
            if flags.chars().all(|c| "gimsuy".contains(c)) {
                return from_flags(source, &flags);
            }
            break;
        }
    }
    from_flags(input.to_string(), "")
}

fn from_flags(source: String, flags: &str) -> ParsedPattern {
    let mut inline = String::new();
    for c in ['i', 'm', 's'] {
        if flags.contains(c) {
            inline.push(c);
        }
    }
    ParsedPattern {
        source,
        global: flags.contains('g'),
        sticky: flags.contains('y'),
        inline,
    }
}

impl ParsedPattern {
    /// Compile, or `None` when the source does not compile — the caller
    /// treats that rule as a no-op for the item.
    pub fn compile(&self) -> Option<Regex> {
        let mut src = String::new();
        if !self.inline.is_empty() {
            src.push_str(&format!("(?{})", self.inline));
        }
        if self.sticky {
            src.push_str(r"\A(?:");
            src.push_str(&self.source);
            src.push(')');
        } else {
            src.push_str(&self.source);
        }
        Regex::new(&src).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_source_has_no_flags() {
        let p = parse_find_pattern("a.b");
        assert_eq!(p.source, "a.b");
        assert!(!p.global && !p.sticky);
    }

    #[test]
    fn delimited_literal_splits_at_last_unescaped_slash() {
        let p = parse_find_pattern("/a\\/b/gi");
        assert_eq!(p.source, "a\\/b");
        assert!(p.global);
        assert_eq!(p.inline, "i");
    }

    #[test]
    fn unknown_flags_fall_back_to_bare_source() {
        let p = parse_find_pattern("/abc/xz");
        assert_eq!(p.source, "/abc/xz");
    }

    #[test]
    fn escaped_substitution_neutralizes_metacharacters() {
        let macros: HashMap<String, String> =
            [("v".to_string(), "a.b".to_string())].into_iter().collect();
        assert_eq!(
            substitute_macro_tokens("{{v}}", &macros, MacroMode::Escaped),
            r"a\.b"
        );
        assert_eq!(
            substitute_macro_tokens("{{v}}", &macros, MacroMode::Raw),
            "a.b"
        );
        assert_eq!(
            substitute_macro_tokens("{{v}}", &macros, MacroMode::None),
            "{{v}}"
        );
    }

    #[test]
    fn sticky_patterns_anchor_at_the_start() {
        let p = parse_find_pattern("/b+/y");
        let re = p.compile().unwrap();
        assert!(re.is_match("bbb"));
        assert!(!re.is_match("abb"));
    }

    #[test]
    fn bad_source_fails_to_compile() {
        assert!(parse_find_pattern("(unclosed").compile().is_none());
    }
}
