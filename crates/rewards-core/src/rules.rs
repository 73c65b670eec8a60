//! Fixed house-rule catalog.
//!
//! The index of each rule is stable: it is stored with every strike and
//! selects the rule's audio cue (`rule<index + 1>.*`).

/// Ordered rule descriptions shown when recording a strike.
pub const RULES: [&str; 8] = [
    "No hitting or touching in any way that might hurt somebody else mentally or for real.",
    "Do NOT disrespect babysitters, parents, your siblings, or anybody in general.",
    "Do not under any circumstance, even if you are asked, throw ANYTHING, especially when you are told not to.",
    "When someone tells you to do something, DO IT without arguments.",
    "Stay in timeout when told!",
    "Follow all directions and rules from adults or whoever is watching you.",
    "Be safe. If something you are doing you don't think is safe, then DON'T do it!",
    "Other (not on this list)",
];

/// Index of the catch-all rule.
pub const OTHER_RULE: usize = RULES.len() - 1;

/// Rule text for `index`, or `None` if it is outside the catalog.
pub fn rule_text(index: usize) -> Option<&'static str> {
    RULES.get(index).copied()
}

/// Resolve free-form rule text back to its catalog index.
///
/// Accepts the text with or without a leading `"N. "` numbering, as older
/// state files stored it either way. Unknown text maps to [`OTHER_RULE`].
pub fn index_of(text: &str) -> usize {
    let trimmed = text.trim();
    let unnumbered = match trimmed.split_once(". ") {
        Some((num, rest)) if !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => trimmed,
    };
    RULES
        .iter()
        .position(|rule| *rule == unnumbered)
        .unwrap_or(OTHER_RULE)
}
