//! Tokenizer for wiki template invocations (`{{name|arg|key=value}}`).
//!
//! Templates nested inside arguments are reported as well, outer first.
//! Scanning is byte-based; every delimiter is ASCII, so slice boundaries
//! always fall on character boundaries.

/// Argument name of a template invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgName {
    /// Implicitly numbered argument, starting at 1.
    Positional(usize),
    /// Explicitly named argument (`key=value`), name trimmed.
    Named(String),
}

impl ArgName {
    /// Numeric index for positional or numerically named arguments.
    pub fn index(&self) -> Option<usize> {
        match self {
            ArgName::Positional(idx) => Some(*idx),
            ArgName::Named(name) => name.parse().ok(),
        }
    }
}

/// One template argument; the value is kept raw apart from trimming.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub name: ArgName,
    pub value: String,
}

/// A parsed template invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Template name with surrounding whitespace removed and `_` read as space.
    pub name: String,
    pub args: Vec<Argument>,
}

impl Invocation {
    fn parse(inner: &str) -> Option<Self> {
        let mut parts = split_top_level(inner, b'|').into_iter();
        let name = parts.next()?.trim().replace('_', " ");
        if name.is_empty() {
            return None;
        }
        let mut positional = 0usize;
        let args = parts
            .map(|part| match find_top_level(part, b'=') {
                Some(eq) => Argument {
                    name: ArgName::Named(part[..eq].trim().to_string()),
                    value: part[eq + 1..].trim().to_string(),
                },
                None => {
                    positional += 1;
                    Argument {
                        name: ArgName::Positional(positional),
                        value: part.trim().to_string(),
                    }
                }
            })
            .collect();
        Some(Self { name, args })
    }
}

/// Every template invocation in `markup`, in document order.
pub fn invocations(markup: &str) -> Vec<Invocation> {
    let cleaned = strip_comments(markup);
    let mut found = Vec::new();
    collect(&cleaned, &mut found);
    found
}

fn collect(text: &str, found: &mut Vec<Invocation>) {
    let mut idx = 0;
    while let Some(offset) = text[idx..].find("{{") {
        let open = idx + offset;
        match closing_braces(text.as_bytes(), open) {
            Some(close) => {
                let inner = &text[open + 2..close];
                if let Some(invocation) = Invocation::parse(inner) {
                    found.push(invocation);
                }
                collect(inner, found);
                idx = close + 2;
            }
            // Unbalanced opener: step past it and keep scanning.
            None => idx = open + 2,
        }
    }
}

/// Index of the `}}` that closes the `{{` at `open`.
fn closing_braces(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'{', b'{') => {
                depth += 1;
                i += 2;
            }
            (b'}', b'}') => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
                i += 2;
            }
            _ => i += 1,
        }
    }
    None
}

/// Walk `text` and report positions of `needle` outside nested `{{ }}`/`[[ ]]`.
fn top_level_positions(text: &str, needle: u8, first_only: bool) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut positions = Vec::new();
    let mut braces = 0usize;
    let mut brackets = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let pair = bytes.get(i + 1).map(|next| (bytes[i], *next));
        match pair {
            Some((b'{', b'{')) => {
                braces += 1;
                i += 2;
                continue;
            }
            Some((b'}', b'}')) => {
                braces = braces.saturating_sub(1);
                i += 2;
                continue;
            }
            Some((b'[', b'[')) => {
                brackets += 1;
                i += 2;
                continue;
            }
            Some((b']', b']')) => {
                brackets = brackets.saturating_sub(1);
                i += 2;
                continue;
            }
            _ => {}
        }
        if bytes[i] == needle && braces == 0 && brackets == 0 {
            positions.push(i);
            if first_only {
                break;
            }
        }
        i += 1;
    }
    positions
}

fn split_top_level(text: &str, separator: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for pos in top_level_positions(text, separator, false) {
        parts.push(&text[start..pos]);
        start = pos + 1;
    }
    parts.push(&text[start..]);
    parts
}

fn find_top_level(text: &str, needle: u8) -> Option<usize> {
    top_level_positions(text, needle, true).into_iter().next()
}

fn strip_comments(markup: &str) -> String {
    let mut cleaned = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(start) = rest.find("<!--") {
        cleaned.push_str(&rest[..start]);
        match rest[start..].find("-->") {
            Some(end) => rest = &rest[start + end + 3..],
            None => {
                rest = "";
            }
        }
    }
    cleaned.push_str(rest);
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_and_named_arguments() {
        let found = invocations("===Proper noun===\n{{given name|en|male|eq=Johann, Jan|from2=Latin}}");
        assert_eq!(found.len(), 1);
        let inv = &found[0];
        assert_eq!(inv.name, "given name");
        assert_eq!(
            inv.args,
            vec![
                Argument {
                    name: ArgName::Positional(1),
                    value: "en".into()
                },
                Argument {
                    name: ArgName::Positional(2),
                    value: "male".into()
                },
                Argument {
                    name: ArgName::Named("eq".into()),
                    value: "Johann, Jan".into()
                },
                Argument {
                    name: ArgName::Named("from2".into()),
                    value: "Latin".into()
                },
            ]
        );
    }

    #[test]
    fn nested_markup_stays_inside_its_argument() {
        let found = invocations("{{given name|en|male|from=[[w:Latin|Latin]]|m={{l|en|John}}}}");
        assert_eq!(found.len(), 2);
        let outer = &found[0];
        assert_eq!(outer.args.len(), 4);
        assert_eq!(outer.args[2].value, "[[w:Latin|Latin]]");
        assert_eq!(outer.args[3].value, "{{l|en|John}}");
        assert_eq!(found[1].name, "l");
    }

    #[test]
    fn numeric_names_map_to_indices() {
        let found = invocations("{{given name|en|2=female}}");
        let args = &found[0].args;
        assert_eq!(args[0].name.index(), Some(1));
        assert_eq!(args[1].name.index(), Some(2));
        assert_eq!(ArgName::Named("eq".into()).index(), None);
    }

    #[test]
    fn comments_and_unbalanced_openers_are_ignored() {
        let found = invocations("{{ broken <!-- {{given name|xx}} --> {{given_name |de}}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "given name");
        assert_eq!(found[0].args[0].value, "de");
    }

    #[test]
    fn non_ascii_text_is_preserved() {
        let found = invocations("Ξ {{given name|el|female|xlit=Xénia}}");
        assert_eq!(found[0].args[2].value, "Xénia");
    }
}
