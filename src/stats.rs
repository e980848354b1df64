use std::collections::HashMap;
use std::hash::Hash;

use tracing::{info, warn};

use crate::errors::NamebaseError;
use crate::types::TallyKey;

/// Counter keyed by any hashable label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tally<K: Eq + Hash = TallyKey> {
    counts: HashMap<K, usize>,
}

impl<K: Eq + Hash> Default for Tally<K> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Ord + Clone> Tally<K> {
    /// Count one occurrence of `key`.
    pub fn add(&mut self, key: impl Into<K>) {
        self.add_n(key, 1);
    }

    /// Count `n` occurrences of `key`.
    pub fn add_n(&mut self, key: impl Into<K>, n: usize) {
        *self.counts.entry(key.into()).or_insert(0) += n;
    }

    /// Count for `key`, zero when never seen.
    pub fn get(&self, key: &K) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when nothing was counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Entries ordered by descending count, then key.
    pub fn most_common(&self) -> Vec<(K, usize)> {
        let mut entries: Vec<(K, usize)> = self
            .counts
            .iter()
            .map(|(key, count)| (key.clone(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }

    /// Add every count from `other`.
    pub fn absorb(&mut self, other: Tally<K>) {
        for (key, count) in other.counts {
            *self.counts.entry(key).or_insert(0) += count;
        }
    }
}

/// Non-fatal extraction outcomes that discard a value or a whole source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoftMiss {
    /// Page markup had no recognized template.
    PatternMiss,
    /// Category title matched no known pattern.
    UnrecognizedCategory,
    /// Category was an interwiki language link.
    LanguageLinkCategory,
    /// Template argument carried nested markup.
    MarkupValue,
    /// Language name could not be resolved.
    UnresolvedLanguage,
    /// Field has no handler when storing facts.
    UnhandledField,
    /// Gender word was not female/male/unisex.
    UnknownGender,
    /// Relationship target is not a stored name.
    MissingTarget,
    /// Relationship pointed back at its own name.
    SelfReference,
}

impl SoftMiss {
    /// Stable label for reports.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PatternMiss => "pattern_miss",
            Self::UnrecognizedCategory => "unrecognized_category",
            Self::LanguageLinkCategory => "language_link_category",
            Self::MarkupValue => "markup_value",
            Self::UnresolvedLanguage => "unresolved_language",
            Self::UnhandledField => "unhandled_field",
            Self::UnknownGender => "unknown_gender",
            Self::MissingTarget => "missing_target",
            Self::SelfReference => "self_reference",
        }
    }
}

/// Share of processed names that produced a given field.
#[derive(Clone, Debug, PartialEq)]
pub struct HitRate {
    pub key: TallyKey,
    pub count: usize,
    pub share: f64,
}

/// Diagnostics accumulated by one pipeline stage.
///
/// Stages return their own accumulator; the driver merges them with `absorb`.
#[derive(Clone, Debug, Default)]
pub struct RunStats {
    /// Names the stage attempted.
    pub names: usize,
    /// Language names that failed to resolve, by spelling.
    pub unresolved_languages: Tally,
    /// Extraction hits by source or field key.
    pub hits: Tally,
    /// Soft misses by kind.
    pub misses: Tally<SoftMiss>,
    /// Per-name failures by `(message, kind)`.
    pub errors: Tally<(String, &'static str)>,
}

impl RunStats {
    /// Record an unresolved language spelling.
    pub fn unresolved_language(&mut self, spelling: &str) {
        self.unresolved_languages.add(spelling.to_string());
        self.misses.add(SoftMiss::UnresolvedLanguage);
    }

    /// Record a per-name failure.
    pub fn record_error(&mut self, err: &NamebaseError) {
        self.errors.add((err.to_string(), err.kind()));
    }

    /// Fold another stage's diagnostics into this one.
    pub fn absorb(&mut self, other: RunStats) {
        self.names += other.names;
        self.unresolved_languages.absorb(other.unresolved_languages);
        self.hits.absorb(other.hits);
        self.misses.absorb(other.misses);
        self.errors.absorb(other.errors);
    }

    /// Hit rates relative to the number of processed names.
    pub fn hit_rates(&self) -> Vec<HitRate> {
        self.hits
            .most_common()
            .into_iter()
            .map(|(key, count)| HitRate {
                share: if self.names == 0 {
                    0.0
                } else {
                    count as f64 / self.names as f64
                },
                key,
                count,
            })
            .collect()
    }

    /// Emit the end-of-run summary.
    pub fn log_summary(&self) {
        for (language, count) in self.unresolved_languages.most_common() {
            info!(count, language = %language, "unresolved language");
        }
        for ((message, kind), count) in self.errors.most_common() {
            warn!(count, kind, "{message}");
        }
        for (miss, count) in self.misses.most_common() {
            info!(count, miss = miss.as_str(), "soft miss");
        }
        for rate in self.hit_rates() {
            info!(
                "parsed {} for {}/{} names ({:.2}%)",
                rate.key,
                rate.count,
                self.names,
                rate.share * 100.0
            );
        }
    }
}
