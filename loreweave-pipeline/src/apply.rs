//! Ordered application of regex rewrite rules to one text.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use loreweave_core::models::{RegexRule, RuleTarget, RuleView};

use crate::pattern::{parse_find_pattern, substitute_macro_tokens};

static MATCH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\{\{\s*match\s*\}\}").unwrap());

/// Depth bounds apply only to history-borne targets. An item without a
/// history depth never matches a depth-filtered rule on those targets.
fn depth_allows(rule: &RegexRule, target: RuleTarget, history_depth: Option<usize>) -> bool {
    if target != RuleTarget::UserInput && target != RuleTarget::AiOutput {
        return true;
    }
    let Some(depth) = history_depth else {
        return false;
    };

    let min = rule.min_depth.filter(|d| *d != -1);
    let max = rule.max_depth.filter(|d| *d != -1);

    if let Some(min) = min {
        if (depth as i64) < min {
            return false;
        }
    }
    if let Some(max) = max {
        if (depth as i64) > max {
            return false;
        }
    }
    true
}

/// Remove each trim substring from the matched text, in listed order.
fn apply_trim(matched: &str, trims: &[String]) -> String {
    let mut out = matched.to_string();
    for t in trims {
        if t.is_empty() {
            continue;
        }
        out = out.replace(t.as_str(), "");
    }
    out
}

/// Build the replacement for one match: `{{match}}` and `$&` take the
/// trimmed match, `$1`..`$99` take capture groups (empty when absent),
/// `$$` is a literal dollar. Everything substitutes literally, in a
/// single pass.
fn interpolate(template: &str, match_trimmed: &str, caps: &Captures<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while !rest.is_empty() {
        // {{match}} token?
        if let Some(m) = MATCH_TOKEN.find(rest) {
            if m.start() == 0 {
                out.push_str(match_trimmed);
                rest = &rest[m.end()..];
                continue;
            }
        }

        let Some(dollar) = rest.find('$') else {
            // Flush up to the next possible {{match}} token, if any.
            match MATCH_TOKEN.find(rest) {
                Some(m) => {
                    out.push_str(&rest[..m.start()]);
                    rest = &rest[m.start()..];
                }
                None => {
                    out.push_str(rest);
                    rest = "";
                }
            }
            continue;
        };

        // Emit the shorter of: text up to `$`, or text up to `{{match}}`.
        if let Some(m) = MATCH_TOKEN.find(rest) {
            if m.start() < dollar {
                out.push_str(&rest[..m.start()]);
                rest = &rest[m.start()..];
                continue;
            }
        }
        out.push_str(&rest[..dollar]);
        rest = &rest[dollar..];

        let tail = &rest[1..];
        if let Some(stripped) = tail.strip_prefix('$') {
            out.push('$');
            rest = stripped;
        } else if let Some(stripped) = tail.strip_prefix('&') {
            out.push_str(match_trimmed);
            rest = stripped;
        } else {
            let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).take(2).collect();
            if digits.is_empty() {
                out.push('$');
                rest = tail;
            } else {
                let n: usize = digits.parse().unwrap_or(0);
                if n >= 1 {
                    if let Some(group) = caps.get(n) {
                        out.push_str(group.as_str());
                    }
                }
                rest = &tail[digits.len()..];
            }
        }
    }

    out
}

/// Sticky-global rewriting: consume consecutive matches from the start
/// of the subject and stop at the first gap. The pattern is compiled
/// `\A`-anchored, so every match begins exactly where the previous one
/// ended.
fn replace_consecutive(
    re: &Regex,
    text: &str,
    mut rewrite: impl FnMut(&Captures<'_>) -> String,
) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(caps) = re.captures(rest) {
        let len = caps.get(0).map(|m| m.len()).unwrap_or(0);
        if len == 0 {
            break;
        }
        out.push_str(&rewrite(&caps));
        rest = &rest[len..];
    }
    out.push_str(rest);
    out
}

/// Apply every applicable rule to `text`, in the caller-merged order.
///
/// A rule is skipped when disabled, when its target or view lists are
/// empty or exclude the item, when depth filtering excludes it, or when
/// its pattern fails to compile. No error ever surfaces from here.
pub fn apply_rules(
    text: &str,
    rules: &[RegexRule],
    target: RuleTarget,
    view: RuleView,
    macros: &HashMap<String, String>,
    history_depth: Option<usize>,
) -> String {
    let mut result = text.to_string();

    for rule in rules {
        if !rule.enabled {
            continue;
        }
        if rule.targets.is_empty() || rule.views.is_empty() {
            continue;
        }
        if !rule.targets.contains(&target) || !rule.views.contains(&view) {
            continue;
        }
        if !depth_allows(rule, target, history_depth) {
            continue;
        }

        let substituted = substitute_macro_tokens(&rule.find_pattern, macros, rule.macro_mode);
        let parsed = parse_find_pattern(&substituted);
        let Some(re) = parsed.compile() else {
            continue;
        };

        let rewrite = |caps: &Captures<'_>| -> String {
            let matched = caps.get(0).map(|m| m.as_str()).unwrap_or("");
            let trimmed = apply_trim(matched, &rule.trim);
            interpolate(&rule.replace_template, &trimmed, caps)
        };

        result = if parsed.global && parsed.sticky {
            replace_consecutive(&re, &result, rewrite)
        } else if parsed.global {
            re.replace_all(&result, rewrite).into_owned()
        } else {
            re.replace(&result, rewrite).into_owned()
        };
    }

    result
}
