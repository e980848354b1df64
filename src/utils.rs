//! Text normalization helpers shared by source parsers.

/// Upper-case the first letter of every word and lower-case the rest.
///
/// A word starts after any non-letter, so `mary-jane` becomes `Mary-Jane`
/// and `o'neil` becomes `O'Neil`.
pub fn title_case<T: AsRef<str>>(text: T) -> String {
    let mut titled = String::with_capacity(text.as_ref().len());
    let mut in_word = false;
    for ch in text.as_ref().chars() {
        if ch.is_alphabetic() {
            if in_word {
                titled.extend(ch.to_lowercase());
            } else {
                titled.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            titled.push(ch);
            in_word = false;
        }
    }
    titled
}

/// Comma-separated fields of `line`, trimmed, with empty fields dropped.
pub fn csv_fields(line: &str) -> Vec<&str> {
    line.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .collect()
}
