//! Name transforms from URL segments to controller and action names.

/// Converts a hyphenated name to StudlyCaps: `new-author` becomes
/// `NewAuthor`.
///
/// Only the first letter of each word is changed, so the transform is
/// idempotent.
#[must_use]
pub fn studly_caps(name: &str) -> String {
    name.split(['-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Converts a hyphenated name to camelCase: `new-author` becomes `newAuthor`.
#[must_use]
pub fn camel_case(name: &str) -> String {
    let studly = studly_caps(name);
    let mut chars = studly.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
