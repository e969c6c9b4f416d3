//! Text normalisation helpers shared by the extractors.

use scraper::Html;

/// Collapse every run of whitespace to a single space and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip markup from a fragment, decode entities and collapse whitespace.
pub fn clean_text(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);
    let text: String = html.root_element().text().collect();
    normalize_whitespace(&text)
}

/// Lower-case and reduce Romanian diacritics to ASCII.
///
/// Both the comma-below (ș, ț) and the legacy cedilla (ş, ţ) forms
/// fold to the same letter, so keyword checks don't depend on how the
/// page was typed.
pub fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'ă' | 'â' => 'a',
            'î' => 'i',
            'ș' | 'ş' => 's',
            'ț' | 'ţ' => 't',
            other => other,
        })
        .collect()
}

/// Turn a display name into an entity id fragment (`[a-z0-9_]`).
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in fold(s).chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}
