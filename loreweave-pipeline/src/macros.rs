//! Macro expansion: variable macros first, then plain key macros.
//!
//! Both the `{{...}}` and `<<...>>` spellings behave identically. Plain
//! keys resolve against the supplied macro map (exact key, else the
//! lower-cased key); unresolved tokens stay verbatim.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use loreweave_core::constants::VARIABLE_MACRO_KEYWORDS;
use loreweave_core::variables::{stringify_value, VariableContext, VariableScope};

static SETVAR_BRACES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{\{\s*setvar\s*::\s*([^:}]+)::\s*([^}]*)\}\}").unwrap()
});
static SETGLOBAL_BRACES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{\{\s*setglobalvar\s*::\s*([^:}]+)::\s*([^}]*)\}\}").unwrap()
});
static GETVAR_BRACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{\{\s*getvar\s*::\s*([^}]+)\}\}").unwrap());
static GETGLOBAL_BRACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{\{\s*getglobalvar\s*::\s*([^}]+)\}\}").unwrap());

static SETVAR_ANGLES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<<\s*setvar\s*::\s*([^:>]+)::\s*([^>]*)>>").unwrap()
});
static SETGLOBAL_ANGLES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<<\s*setglobalvar\s*::\s*([^:>]+)::\s*([^>]*)>>").unwrap()
});
static GETVAR_ANGLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<<\s*getvar\s*::\s*([^>]+)>>").unwrap());
static GETGLOBAL_ANGLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<<\s*getglobalvar\s*::\s*([^>]+)>>").unwrap());

static KEY_BRACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([a-zA-Z0-9_]+)\s*\}\}").unwrap());
static KEY_ANGLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<\s*([a-zA-Z0-9_]+)\s*>>").unwrap());

fn set_macro(text: &str, re: &Regex, scope: VariableScope, ctx: &mut VariableContext) -> String {
    re.replace_all(text, |caps: &Captures<'_>| {
        let name = caps[1].trim().to_string();
        let value = caps[2].trim().to_string();
        ctx.set(scope, name, serde_json::Value::String(value));
        String::new()
    })
    .into_owned()
}

fn get_macro(text: &str, re: &Regex, scope: VariableScope, ctx: &VariableContext) -> String {
    re.replace_all(text, |caps: &Captures<'_>| {
        stringify_value(ctx.get(scope, caps[1].trim()))
    })
    .into_owned()
}

/// Resolve `setvar` / `setglobalvar` / `getvar` / `getglobalvar` macros.
/// Sets run before gets so a value written earlier in the same text is
/// readable later in it.
fn expand_variable_macros(text: &str, ctx: &mut VariableContext) -> String {
    let mut out = set_macro(text, &SETVAR_BRACES, VariableScope::Local, ctx);
    out = set_macro(&out, &SETGLOBAL_BRACES, VariableScope::Global, ctx);
    out = get_macro(&out, &GETVAR_BRACES, VariableScope::Local, ctx);
    out = get_macro(&out, &GETGLOBAL_BRACES, VariableScope::Global, ctx);

    out = set_macro(&out, &SETVAR_ANGLES, VariableScope::Local, ctx);
    out = set_macro(&out, &SETGLOBAL_ANGLES, VariableScope::Global, ctx);
    out = get_macro(&out, &GETVAR_ANGLES, VariableScope::Local, ctx);
    out = get_macro(&out, &GETGLOBAL_ANGLES, VariableScope::Global, ctx);
    out
}

fn is_variable_keyword(key: &str) -> bool {
    let lower = key.to_lowercase();
    VARIABLE_MACRO_KEYWORDS.iter().any(|k| *k == lower)
}

/// Look up a macro key: exact match first, then the lower-cased key.
fn resolve_key<'a>(macros: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    if let Some(v) = macros.get(key) {
        return Some(v);
    }
    macros.get(&key.to_lowercase()).map(String::as_str)
}

fn expand_plain_keys(text: &str, re: &Regex, macros: &HashMap<String, String>) -> String {
    re.replace_all(text, |caps: &Captures<'_>| {
        let key = &caps[1];
        if is_variable_keyword(key) {
            return caps[0].to_string();
        }
        match resolve_key(macros, key) {
            Some(v) => v.to_string(),
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}

/// Expand macros in `text`: variable macros first (when a context is
/// supplied), then plain key macros in both spellings.
pub fn expand_macros(
    text: &str,
    macros: &HashMap<String, String>,
    variables: Option<&mut VariableContext>,
) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = match variables {
        Some(ctx) => expand_variable_macros(text, ctx),
        None => text.to_string(),
    };

    out = expand_plain_keys(&out, &KEY_ANGLES, macros);
    out = expand_plain_keys(&out, &KEY_BRACES, macros);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn macros(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn setvar_then_getvar_in_one_text() {
        let mut ctx = VariableContext::new();
        let out = expand_macros("{{setvar::x::5}}{{getvar::x}}", &macros(&[]), Some(&mut ctx));
        assert_eq!(out, "5");
        assert_eq!(ctx.get(VariableScope::Local, "x"), Some(&json!("5")));
    }

    #[test]
    fn angle_spelling_behaves_identically() {
        let mut ctx = VariableContext::new();
        let out = expand_macros("<<setvar::x::5>><<getvar::x>>", &macros(&[]), Some(&mut ctx));
        assert_eq!(out, "5");
    }

    #[test]
    fn setvar_trims_name_and_value() {
        let mut ctx = VariableContext::new();
        expand_macros("{{setvar:: mood :: gloomy }}", &macros(&[]), Some(&mut ctx));
        assert_eq!(ctx.get(VariableScope::Local, "mood"), Some(&json!("gloomy")));
    }

    #[test]
    fn global_scope_is_separate() {
        let mut ctx = VariableContext::new();
        let out = expand_macros(
            "{{setglobalvar::x::g}}{{setvar::x::l}}{{getglobalvar::x}}/{{getvar::x}}",
            &macros(&[]),
            Some(&mut ctx),
        );
        assert_eq!(out, "g/l");
    }

    #[test]
    fn missing_variable_reads_as_empty() {
        let mut ctx = VariableContext::new();
        let out = expand_macros("[{{getvar::nothing}}]", &macros(&[]), Some(&mut ctx));
        assert_eq!(out, "[]");
    }

    #[test]
    fn structured_values_render_as_compact_json() {
        let mut ctx = VariableContext::new();
        ctx.set(VariableScope::Local, "obj", json!({"a": 1}));
        let out = expand_macros("{{getvar::obj}}", &macros(&[]), Some(&mut ctx));
        assert_eq!(out, r#"{"a":1}"#);
    }

    #[test]
    fn plain_keys_resolve_exact_then_lowercase() {
        let m = macros(&[("char", "Alice")]);
        assert_eq!(expand_macros("{{char}} / {{CHAR}}", &m, None), "Alice / Alice");
        assert_eq!(expand_macros("<<char>>", &m, None), "Alice");
    }

    #[test]
    fn unknown_keys_pass_through_verbatim() {
        assert_eq!(expand_macros("{{foo}}", &macros(&[]), None), "{{foo}}");
    }

    #[test]
    fn variable_keywords_never_resolve_as_plain_keys() {
        let m = macros(&[("getvar", "oops")]);
        assert_eq!(expand_macros("{{getvar}}", &m, None), "{{getvar}}");
        assert_eq!(expand_macros("<<getvar>>", &m, None), "<<getvar>>");
    }
}
