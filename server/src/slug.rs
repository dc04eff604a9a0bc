//! URL slugs for recipe detail pages.

/// Derive a URL-safe slug from a recipe name.
///
/// Lower-cases the name, collapses each run of whitespace into a single
/// hyphen, then drops everything that is not `[a-z0-9-]`. Leading and
/// trailing hyphens are kept and there is no length cap, so the result may be
/// empty and distinct names may share a slug.
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }

    slug
}

/// Pick the first free slug among `base`, `base-2`, `base-3`, ...
///
/// `is_taken` is fallible so a store can answer it from inside a transaction.
pub fn disambiguate<E>(
    base: &str,
    mut is_taken: impl FnMut(&str) -> Result<bool, E>,
) -> Result<String, E> {
    if !is_taken(base)? {
        return Ok(base.to_string());
    }

    let mut n: u32 = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !is_taken(&candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}
