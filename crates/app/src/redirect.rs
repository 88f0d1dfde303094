//! Post-login redirect targets.

/// Where the OAuth callback lands without a usable `next` parameter.
pub const DEFAULT_REDIRECT: &str = "/dashboard";

/// Sanitize a caller-supplied `next` path.
///
/// Only same-origin relative paths are kept: a single leading `/`, no
/// `//` or `/\` prefix and no control characters. Anything else yields
/// [`DEFAULT_REDIRECT`].
#[must_use]
pub fn safe_redirect_path(next: Option<&str>) -> &str {
    let Some(path) = next.map(str::trim) else {
        return DEFAULT_REDIRECT;
    };

    let safe = path.starts_with('/')
        && !path.starts_with("//")
        && !path.starts_with("/\\")
        && !path.chars().any(char::is_control);

    if safe { path } else { DEFAULT_REDIRECT }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_kept() {
        assert_eq!(safe_redirect_path(Some("/programas?tab=cashback")), "/programas?tab=cashback");
        assert_eq!(safe_redirect_path(Some(" /ajustes ")), "/ajustes");
    }

    #[test]
    fn everything_else_falls_back() {
        for next in [
            None,
            Some(""),
            Some("dashboard"),
            Some("//evil.example.com"),
            Some("/\\evil.example.com"),
            Some("https://evil.example.com"),
            Some("/ok\r\nSet-Cookie: x=1"),
        ] {
            assert_eq!(safe_redirect_path(next), DEFAULT_REDIRECT, "{next:?}");
        }
    }
}
