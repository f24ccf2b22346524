//! Query-side synonym expansion.
//!
//! Each plain word in a query is replaced with an `OR` group containing the
//! word and its known synonyms, so a search for "fast" also matches
//! documents that say "quick". The built-in English map stays tiny on
//! purpose. Output is valid FTS5 `MATCH` syntax.

/// Look up the synonym group for a lowercased token.
fn synonyms_for(token: &str) -> Option<&'static [&'static str]> {
    match token {
        "fast" => Some(&["quick", "rapid", "speedy"]),
        "quick" => Some(&["fast", "rapid", "speedy"]),
        "rapid" => Some(&["fast", "quick", "speedy"]),
        "speedy" => Some(&["fast", "quick", "rapid"]),
        _ => None,
    }
}

/// Expand a plain-word query with known synonyms.
///
/// Queries carrying FTS operator characters (quotes, parentheses, `*`, `-`,
/// column filters) pass through untouched — rewriting them could change or
/// break the query's meaning, and invalid syntax is the caller's error to
/// receive.
pub fn expand(query: &str) -> String {
    let is_plain = query
        .chars()
        .all(|c| c.is_alphanumeric() || c.is_whitespace() || c == '_');
    if !is_plain {
        return query.to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    for token in query.split_whitespace() {
        match synonyms_for(&token.to_lowercase()) {
            Some(synonyms) => {
                let group = std::iter::once(token)
                    .chain(synonyms.iter().copied())
                    .collect::<Vec<_>>()
                    .join(" OR ");
                parts.push(format!("({})", group));
            }
            None => parts.push(token.to_string()),
        }
    }

    if parts.is_empty() {
        query.to_string()
    } else {
        parts.join(" ")
    }
}
