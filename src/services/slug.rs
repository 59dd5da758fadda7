//! URL slug generation
//!
//! Both variants keep ASCII digits, whitespace and hyphens, collapse whitespace
//! runs into a single hyphen and then hyphen runs into one. Leading and trailing
//! hyphens are left alone; callers that need a clean edge trim them.

/// Slug for English text: lowercased, only `[a-z0-9]` survive.
pub fn slugify_en(text: &str) -> String {
    collapse(text.to_lowercase().chars().filter(|c| keep_en(*c)))
}

/// Slug for Arabic text: the Arabic block (U+0600..=U+06FF) survives next to
/// `[a-z0-9]`. No case folding, so uppercase Latin letters are dropped.
pub fn slugify_ar(text: &str) -> String {
    collapse(text.chars().filter(|c| keep_en(*c) || is_arabic(*c)))
}

/// `slugify_en` with edge hyphens removed, for product URLs
pub fn product_slug(title: &str) -> String {
    slugify_en(title).trim_matches('-').to_string()
}

fn keep_en(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || c == '-'
}

fn is_arabic(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

fn collapse(chars: impl Iterator<Item = char>) -> String {
    let mut out = String::new();
    let mut last_hyphen = false;
    for c in chars {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' {
            if !last_hyphen {
                out.push('-');
            }
            last_hyphen = true;
        } else {
            out.push(c);
            last_hyphen = false;
        }
    }
    out
}
