//! Name-to-bucket classification.
//!
//! A bucket is derived only from the leading character of a name, so the same
//! spelling always lands in the same partition file across runs.

use std::fmt;

use deunicode::deunicode_char;
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::constants::buckets::{
    ALPHABET_MARKERS, CASE_QUALIFIERS, CJK_PREFIX, FULL_ALPHABETS, LABEL_CJK, LABEL_OTHER,
    LABEL_OTHER_LETTER, LABEL_SEPARATOR, LETTER_ALPHABETS, LETTER_CHUNKS,
};

const ASCII_LETTERS: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S",
    "T", "U", "V", "W", "X", "Y", "Z",
];

/// Partition key for a name.
///
/// Labels are always drawn from fixed tables, so a bucket is `Copy` and never
/// owns heap data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    /// One bucket for a whole class of names (`Other`, `CJK`, `Cyrillic`, ...).
    Single(&'static str),
    /// An alphabet split by leading ASCII letter or letter chunk.
    Letter {
        /// Title-cased alphabet label, e.g. `Latin`.
        alphabet: &'static str,
        /// Single letter, shared chunk (`NO`, `XYZ`, ...), or `Other`.
        letter: &'static str,
    },
}

impl Bucket {
    /// Labels in partition order.
    pub fn labels(&self) -> Vec<&'static str> {
        match self {
            Bucket::Single(label) => vec![*label],
            Bucket::Letter { alphabet, letter } => vec![*alphabet, *letter],
        }
    }

    /// Partition file stem, e.g. `Latin_NO` or `Cyrillic`.
    pub fn file_stem(&self) -> String {
        self.labels().join(LABEL_SEPARATOR)
    }

    /// Partition file name with the given extension.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.file_stem(), extension)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Single(label) => f.write_str(label),
            Bucket::Letter { alphabet, letter } => write!(f, "{alphabet} {letter}"),
        }
    }
}

/// Assign `name` to its bucket.
///
/// Only the first `char` is inspected. Empty input is not a meaningful name;
/// it maps to `Other` so the function stays total.
pub fn classify(name: &str) -> Bucket {
    let Some(leading) = name.chars().next() else {
        return Bucket::Single(LABEL_OTHER);
    };
    if !is_letter(leading) {
        return Bucket::Single(LABEL_OTHER);
    }
    let Some(unicode_name) = unicode_names2::name(leading) else {
        return Bucket::Single(LABEL_OTHER);
    };
    let unicode_name = unicode_name.to_string();
    if unicode_name.starts_with(CJK_PREFIX) {
        return Bucket::Single(LABEL_CJK);
    }

    let Some(alphabet) = alphabet_prefix(&unicode_name) else {
        return Bucket::Single(LABEL_OTHER_LETTER);
    };
    if let Some(label) = lookup_label(&LETTER_ALPHABETS, alphabet) {
        let letter = ascii_letter(leading)
            .map(letter_bucket)
            .unwrap_or(LABEL_OTHER);
        return Bucket::Letter {
            alphabet: label,
            letter,
        };
    }
    if let Some(label) = lookup_label(&FULL_ALPHABETS, alphabet) {
        return Bucket::Single(label);
    }
    Bucket::Single(LABEL_OTHER_LETTER)
}

fn is_letter(ch: char) -> bool {
    matches!(
        get_general_category(ch),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

/// Alphabet prefix of a Unicode character name, e.g. `GREEK` for
/// `GREEK CAPITAL LETTER ALPHA`.
fn alphabet_prefix(unicode_name: &str) -> Option<&str> {
    let words: Vec<&str> = unicode_name.split(' ').collect();
    for marker in ALPHABET_MARKERS {
        let Some(mut idx) = words.iter().position(|word| *word == marker) else {
            continue;
        };
        if marker == "LETTER" && idx > 0 && CASE_QUALIFIERS.contains(&words[idx - 1]) {
            idx -= 1;
        }
        // Unicode names are single-spaced, so the prefix is a plain byte slice.
        let end = words[..idx]
            .iter()
            .map(|word| word.len() + 1)
            .sum::<usize>()
            .saturating_sub(1);
        return Some(&unicode_name[..end]);
    }
    None
}

fn lookup_label(table: &[(&str, &'static str)], alphabet: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(prefix, _)| *prefix == alphabet)
        .map(|(_, label)| *label)
}

fn ascii_letter(ch: char) -> Option<char> {
    let first = deunicode_char(ch)?.chars().next()?.to_ascii_uppercase();
    first.is_ascii_alphabetic().then_some(first)
}

fn letter_bucket(letter: char) -> &'static str {
    LETTER_CHUNKS
        .iter()
        .find(|chunk| chunk.contains(letter))
        .copied()
        .unwrap_or_else(|| ASCII_LETTERS[(letter as u8 - b'A') as usize])
}
