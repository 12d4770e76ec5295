use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Letter/number runs, joined across single interior apostrophes (ASCII or U+2019).
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}\p{N}]+)*").expect("valid regex");
}

/// Lowercase one char at a time, without context-sensitive rules such as
/// Greek final sigma (`ΟΔΟΣ` -> `οδοσ`).
pub fn lowercase(term: &str) -> String {
    term.chars().flat_map(char::to_lowercase).collect()
}

/// Iterate the lowercased terms of a line without collecting them.
pub fn terms(line: &str) -> impl Iterator<Item = String> + '_ {
    RE.find_iter(line).map(|m| lowercase(m.as_str()))
}

/// Tokenize a line of text into lowercase terms, in order of appearance.
pub fn tokenize(line: &str) -> Vec<String> {
    terms(line).collect()
}
