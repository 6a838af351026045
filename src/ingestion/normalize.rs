//! Column name normalization for structured landing tables

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[\s\-]+").expect("valid separator pattern");
    static ref CASE_BOUNDARY: Regex = Regex::new(r"([a-z0-9])([A-Z])").expect("valid case pattern");
    static ref REPEATED_UNDERSCORES: Regex = Regex::new(r"_+").expect("valid underscore pattern");
}

/// Convert camelCase, spaced or hyphenated names to snake_case.
///
/// - `userID` -> `user_id`
/// - `First Name` -> `first_name`
/// - `order-date` -> `order_date`
///
/// Already normalized names come back unchanged.
pub fn to_snake_case(name: &str) -> String {
    let separated = SEPARATORS.replace_all(name, "_");
    let split = CASE_BOUNDARY.replace_all(&separated, "${1}_${2}");
    let lowered = split.to_lowercase();
    REPEATED_UNDERSCORES
        .replace_all(lowered.trim_matches('_'), "_")
        .into_owned()
}
