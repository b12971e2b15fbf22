//! Source URL validation.

/// Returns `true` when `candidate` looks like a loadable script URL.
///
/// Accepts `//host.tld/...`, optionally prefixed with `http:` or `https:`.
/// The part after `//` must contain a dot with at least one character on
/// either side, and the whole candidate must be free of whitespace.
///
/// Only used when building a script from a bare string; the load path never
/// validates.
#[must_use]
pub fn is_valid_src(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }

    let without_scheme = candidate
        .strip_prefix("https:")
        .or_else(|| candidate.strip_prefix("http:"))
        .unwrap_or(candidate);

    let Some(rest) = without_scheme.strip_prefix("//") else {
        return false;
    };

    rest.char_indices()
        .any(|(index, ch)| ch == '.' && index > 0 && index + 1 < rest.len())
}
