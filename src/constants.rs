/// Constants used by the name-to-bucket classifier.
pub mod buckets {
    /// Unicode-name marker tokens that end the alphabet prefix, in lookup order.
    pub const ALPHABET_MARKERS: [&str; 5] = ["LETTER", "SYLLABLE", "CHARACTER", "SIGN", "SYLLABICS"];
    /// Case qualifiers that may precede `LETTER` and belong to the marker.
    pub const CASE_QUALIFIERS: [&str; 3] = ["CAPITAL", "SMALL", "CURSIVE"];
    /// Alphabets bucketed per leading ASCII letter, as `(unicode prefix, label)`.
    pub const LETTER_ALPHABETS: [(&str, &str); 1] = [("LATIN", "Latin")];
    /// Alphabets kept in a single bucket, as `(unicode prefix, label)`.
    pub const FULL_ALPHABETS: [(&str, &str); 7] = [
        ("CYRILLIC", "Cyrillic"),
        ("HIRAGANA", "Hiragana"),
        ("GREEK", "Greek"),
        ("ARABIC", "Arabic"),
        ("ARMENIAN", "Armenian"),
        ("BENGALI", "Bengali"),
        ("HEBREW", "Hebrew"),
    ];
    /// Sparse letters that share a bucket.
    pub const LETTER_CHUNKS: [&str; 4] = ["NO", "QR", "UVW", "XYZ"];
    /// Unicode-name prefix routed to the CJK bucket.
    pub const CJK_PREFIX: &str = "CJK";
    /// Label for names whose leading character is not a letter.
    pub const LABEL_OTHER: &str = "Other";
    /// Label for letters outside every known alphabet.
    pub const LABEL_OTHER_LETTER: &str = "OtherLetter";
    /// Label for CJK ideographs.
    pub const LABEL_CJK: &str = "CJK";
    /// Separator between bucket labels in partition file stems.
    pub const LABEL_SEPARATOR: &str = "_";
}

/// Constants used by category and template extraction.
pub mod extract {
    /// Source prefix for category-derived facts.
    pub const CATEGORY_SOURCE: &str = "cat";
    /// Prefix carried by every category title.
    pub const CATEGORY_PREFIX: &str = "Category:";
    /// Template field whose values must resolve to language tags.
    pub const TEMPLATE_FROM_FIELD: &str = "given-name.from";
    /// Hit-rate key for names with category facts.
    pub const HIT_CATEGORIES: &str = "categories";
    /// Hit-rate key for names with template facts.
    pub const HIT_PAGES: &str = "pages";
}

/// Constants used by fact records and partition files.
pub mod facts {
    /// Record field holding the OR-accumulated gender bits.
    pub const GENDER_FLAG_FIELD: &str = "gender_flag";
    /// Record field holding language-of-use tags.
    pub const LANG_FIELD: &str = "lang";
    /// Record field holding language-of-origin tags.
    pub const ORIGIN_FIELD: &str = "origin";
}

/// Constants used by pipeline configuration defaults.
pub mod config {
    /// Default directory for partition files.
    pub const DEFAULT_DATA_ROOT: &str = "data";
    /// Default directory for cached nickname source files.
    pub const DEFAULT_CACHE_ROOT: &str = "misc_sources/cache";
    /// Default path for the persisted name store.
    pub const DEFAULT_STORE_PATH: &str = "wiktionary.json";
    /// Default partition file extension.
    pub const DEFAULT_PARTITION_EXTENSION: &str = "yaml";
}
