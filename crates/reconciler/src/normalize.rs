//! Canonical form for endpoint identity.

/// Upper-case the method so `get` and `GET` collapse to one key.
pub fn normalize_method(method: &str) -> String {
    method.trim().to_uppercase()
}

/// Canonicalize a path: collapse slash runs, force a leading slash, strip
/// trailing slashes everywhere but the root.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    let mut out = String::with_capacity(trimmed.len() + 1);
    if !trimmed.starts_with('/') {
        out.push('/');
    }
    let mut previous_slash = false;
    for ch in trimmed.chars() {
        if ch == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(ch);
    }
    while out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}
