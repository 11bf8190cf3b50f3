//! Keyword trigger evaluation for one lore entry against one context text.

use loreweave_core::models::{LoreEntry, SelectiveLogic};

fn contains_keyword(text: &str, keyword: &str, case_sensitive: bool) -> bool {
    if keyword.is_empty() {
        return false;
    }
    if case_sensitive {
        text.contains(keyword)
    } else {
        text.to_lowercase().contains(&keyword.to_lowercase())
    }
}

fn any_included(text: &str, keywords: &[String], case_sensitive: bool) -> bool {
    keywords
        .iter()
        .any(|k| contains_keyword(text, k, case_sensitive))
}

fn all_included(text: &str, keywords: &[String], case_sensitive: bool) -> bool {
    let non_empty: Vec<&String> = keywords.iter().filter(|k| !k.is_empty()).collect();
    if non_empty.is_empty() {
        return true;
    }
    non_empty
        .iter()
        .all(|k| contains_keyword(text, k, case_sensitive))
}

/// The secondary-keyword gate. An empty (or all-empty) secondary list
/// passes vacuously regardless of logic.
fn secondary_gate(
    logic: SelectiveLogic,
    text: &str,
    secondary: &[String],
    case_sensitive: bool,
) -> bool {
    let non_empty: Vec<String> = secondary.iter().filter(|k| !k.is_empty()).cloned().collect();
    if non_empty.is_empty() {
        return true;
    }
    match logic {
        SelectiveLogic::AndAny => any_included(text, &non_empty, case_sensitive),
        SelectiveLogic::AndAll => all_included(text, &non_empty, case_sensitive),
        SelectiveLogic::NotAny => !any_included(text, &non_empty, case_sensitive),
        SelectiveLogic::NotAll => !all_included(text, &non_empty, case_sensitive),
    }
}

/// Whether a keyword-mode entry fires against `text`.
///
/// The primary list is `key`, or `secondary_key` when `key` has no
/// non-empty strings; both empty fails. A primary hit is further gated
/// by `selective_logic` over `secondary_key` whenever the raw `key`
/// list is non-empty, even when every string in it is empty.
pub fn keyword_triggered(entry: &LoreEntry, text: &str, case_sensitive: bool) -> bool {
    let primary: Vec<String> = entry.key.iter().filter(|k| !k.is_empty()).cloned().collect();
    let primary_list: Vec<String> = if primary.is_empty() {
        entry
            .secondary_key
            .iter()
            .filter(|k| !k.is_empty())
            .cloned()
            .collect()
    } else {
        primary
    };
    if primary_list.is_empty() {
        return false;
    }

    if !any_included(text, &primary_list, case_sensitive) {
        return false;
    }

    if !entry.key.is_empty() {
        return secondary_gate(entry.selective_logic, text, &entry.secondary_key, case_sensitive);
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use loreweave_core::models::ActivationMode;

    fn entry(key: &[&str], secondary: &[&str], logic: SelectiveLogic) -> LoreEntry {
        LoreEntry {
            index: 0,
            name: String::new(),
            content: String::new(),
            enabled: true,
            activation_mode: ActivationMode::Keyword,
            key: key.iter().map(|k| k.to_string()).collect(),
            secondary_key: secondary.iter().map(|k| k.to_string()).collect(),
            selective_logic: logic,
            order: 0.0,
            depth: 0.0,
            position: "afterChar".to_string(),
            role: None,
            case_sensitive: None,
            exclude_recursion: false,
            prevent_recursion: false,
            probability: 100.0,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn all_empty_key_still_arms_the_secondary_gate() {
        // With `key` = [""] the secondary list doubles as primary, but
        // the selective-logic gate stays armed because the raw key list
        // is non-empty.
        let e = entry(&[""], &["magic"], SelectiveLogic::NotAny);
        assert!(!keyword_triggered(&e, "a tale of magic", false));

        let e = entry(&[], &["magic"], SelectiveLogic::NotAny);
        assert!(keyword_triggered(&e, "a tale of magic", false));
    }

    #[test]
    fn case_insensitive_by_default_paths() {
        assert!(contains_keyword("The Ruins", "ruins", false));
        assert!(!contains_keyword("The Ruins", "ruins", true));
    }

    #[test]
    fn all_included_is_vacuous_for_empty_list() {
        assert!(all_included("anything", &[], false));
        assert!(all_included("anything", &[String::new()], false));
    }
}
