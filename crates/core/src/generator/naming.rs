//! Identifier conventions for generated types and fields

/// Split on `_`, `-`, spaces and lower-to-upper case boundaries
fn words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;

    for c in input.chars() {
        if c == '_' || c == '-' || c.is_whitespace() || !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// `home_address` -> `HomeAddress`
pub fn pascal_case(input: &str) -> String {
    words(input).iter().map(|w| capitalize(w)).collect()
}

/// `homeAddress` -> `home_address`; leading digits get a `_` prefix
pub fn snake_case(input: &str) -> String {
    let joined = words(input)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_");
    let ident = if joined.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", joined)
    } else {
        joined
    };
    if is_keyword(&ident) {
        format!("{}_", ident)
    } else {
        ident
    }
}

/// Type name for `key` with an optional prefix
pub fn type_name(prefix: &str, key: &str) -> String {
    let base = pascal_case(key);
    let base = if base.is_empty() { "Value".to_string() } else { base };
    if base.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{}T{}", prefix, base)
    } else {
        format!("{}{}", prefix, base)
    }
}

/// Best-effort English singular of a plural noun
pub fn singularize(word: &str) -> String {
    const IRREGULAR: &[(&str, &str)] = &[
        ("people", "person"),
        ("children", "child"),
        ("men", "man"),
        ("women", "woman"),
        ("mice", "mouse"),
    ];

    let lower = word.to_lowercase();
    for (plural, singular) in IRREGULAR {
        if word.is_ascii() && lower.ends_with(plural) {
            let stem = &word[..word.len() - plural.len()];
            return format!("{}{}", stem, singular);
        }
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    for suffix in ["sses", "xes", "ches", "shes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && word.len() > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

fn is_keyword(ident: &str) -> bool {
    matches!(
        ident,
        "as" | "break" | "const" | "continue" | "crate" | "else" | "enum" | "extern" | "false"
            | "fn" | "for" | "if" | "impl" | "in" | "let" | "loop" | "match" | "mod" | "move"
            | "mut" | "pub" | "ref" | "return" | "self" | "static" | "struct" | "super"
            | "trait" | "true" | "type" | "unsafe" | "use" | "where" | "while" | "async"
            | "await" | "dyn"
    )
}
