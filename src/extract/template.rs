use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::constants::extract::TEMPLATE_FROM_FIELD;
use crate::extract::markup::{ArgName, Invocation};
use crate::facts::FactSet;
use crate::language::LanguageResolver;
use crate::stats::{RunStats, SoftMiss};

/// Variant suffix on field names (`from2`, `eq3`), keeping the leading word.
static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z_]+)\d+").expect("trailing number pattern"));

/// Positional-argument schema for one recognized template.
#[derive(Clone, Copy, Debug)]
pub struct TemplateSchema {
    /// Template name as written in page markup.
    pub name: &'static str,
    /// Field prefix, the name with spaces replaced by dashes.
    pub prefix: &'static str,
    positional: &'static [(usize, &'static str)],
}

impl TemplateSchema {
    /// Logical field for positional argument `idx`.
    pub fn positional_field(&self, idx: usize) -> Option<&'static str> {
        self.positional
            .iter()
            .find(|(position, _)| *position == idx)
            .map(|(_, field)| *field)
    }
}

/// Templates whose arguments are turned into facts.
pub const TEMPLATE_SCHEMAS: [TemplateSchema; 3] = [
    TemplateSchema {
        name: "given name",
        prefix: "given-name",
        positional: &[(1, "lang"), (2, "gender"), (3, "from"), (4, "from"), (5, "from")],
    },
    TemplateSchema {
        name: "alternative form of",
        prefix: "alternative-form-of",
        positional: &[(1, "lang"), (2, "alt")],
    },
    TemplateSchema {
        name: "historical given name",
        prefix: "historical-given-name",
        positional: &[(1, "lang"), (2, "gender"), (3, "notorious")],
    },
];

/// Schema for a template name, if it is one we extract.
pub fn schema_for(name: &str) -> Option<&'static TemplateSchema> {
    TEMPLATE_SCHEMAS.iter().find(|schema| schema.name == name)
}

/// Collapse `from2`/`from3` onto `from`.
pub fn collapse_variant_suffix(field: &str) -> &str {
    TRAILING_NUMBER
        .captures(field)
        .and_then(|caps| caps.get(1))
        .map_or(field, |m| m.as_str())
}

/// Turn one recognized invocation into `<prefix>.<field>` facts.
pub fn parse_invocation(
    invocation: &Invocation,
    schema: &TemplateSchema,
    resolver: &(impl LanguageResolver + ?Sized),
    stats: &mut RunStats,
) -> FactSet {
    let mut facts = FactSet::new();
    for arg in &invocation.args {
        let field = match (&arg.name, arg.name.index()) {
            (_, Some(idx)) => match schema.positional_field(idx) {
                Some(field) => field,
                None => {
                    debug!(template = schema.name, idx, "no schema entry for argument");
                    stats.misses.add(SoftMiss::UnhandledField);
                    continue;
                }
            },
            (ArgName::Named(name), None) => name.as_str(),
            (ArgName::Positional(_), None) => unreachable!("positional arguments have indices"),
        };
        let key = format!("{}.{}", schema.prefix, collapse_variant_suffix(field));

        let value = arg.value.as_str();
        if value.is_empty() {
            continue;
        }
        if value.contains('{') || value.contains('[') {
            debug!(key = %key, value, "markup in template argument");
            stats.misses.add(SoftMiss::MarkupValue);
            continue;
        }

        if key == TEMPLATE_FROM_FIELD {
            if value.contains('<') || value.contains(':') {
                debug!(value, "origin value is not a plain language name");
                stats.misses.add(SoftMiss::MarkupValue);
                continue;
            }
            match resolver.resolve(value) {
                Ok(tag) => facts.add(key, tag),
                Err(err) => {
                    debug!(%err, "skipping unknown \"from\" language");
                    stats.unresolved_language(value);
                }
            }
            continue;
        }

        facts.add(key, value);
    }
    facts
}
