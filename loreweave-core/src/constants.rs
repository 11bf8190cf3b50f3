/// Engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of re-evaluation passes after pass 0 during lore
/// activation, unless the caller overrides it.
pub const DEFAULT_RECURSION_LIMIT: usize = 5;

/// How many of the most recent history items feed the lore-matching
/// context text by default.
pub const DEFAULT_RECENT_HISTORY_WINDOW: usize = 5;

/// Identifier of the preset block that stands in for the chat history.
pub const CHAT_HISTORY_IDENTIFIER: &str = "chatHistory";

/// Default mapping from raw lore position strings to preset block
/// identifiers: `(raw position, block identifier)`.
pub const DEFAULT_POSITION_MAP: [(&str, &str); 2] =
    [("beforeChar", "charBefore"), ("afterChar", "charAfter")];

/// Synthetic sequence base for fixed lore injections. Keeps preset
/// injections ahead of lore injections at equal (depth, order).
pub const LORE_INJECTION_SEQ_BASE: usize = 10_000;

/// Macro keywords reserved for the variable store. These never resolve as
/// plain key macros.
pub const VARIABLE_MACRO_KEYWORDS: [&str; 4] =
    ["getvar", "setvar", "getglobalvar", "setglobalvar"];
