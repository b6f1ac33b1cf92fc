//! Turning episode titles into filesystem-safe file names.

/// Characters that are unsafe in file names on common filesystems.
const UNSAFE: &[char] = &['/', '\\', ':', '*', '?', '"', '\'', '<', '>', '|'];

/// Sanitizes an episode title into a name safe to use as a file stem.
///
/// Path separators, wildcard and quote characters become `-`; every run of
/// whitespace collapses to a single `_`. The function is total and
/// idempotent, so a sanitized name passed in again comes back unchanged.
#[must_use]
pub fn sanitize(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_space = false;

    for c in title.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push('_');
            pending_space = false;
        }
        out.push(if UNSAFE.contains(&c) { '-' } else { c });
    }
    if pending_space {
        out.push('_');
    }

    out
}
