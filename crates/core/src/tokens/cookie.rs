//! Session cookie rendering.

use jiff::SignedDuration;

/// Default admin session cookie name.
pub const DEFAULT_SESSION_COOKIE: &str = "lealtad_admin";

/// Attributes for the admin session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    name: String,
    max_age: SignedDuration,
}

impl SessionCookie {
    /// Cookie named `name` that lives for `max_age`.
    pub fn new(name: impl Into<String>, max_age: SignedDuration) -> Self {
        Self {
            name: name.into(),
            max_age,
        }
    }

    /// Cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn set_value(&self, token: &str) -> String {
        self.render(token, self.max_age.as_secs().max(0))
    }

    /// `Set-Cookie` value that removes the cookie.
    pub fn clear_value(&self) -> String {
        self.render("", 0)
    }

    /// Find this cookie in a `Cookie` request header.
    pub fn read<'a>(&self, header: &'a str) -> Option<&'a str> {
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        format!(
            "{}={value}; Path=/; Max-Age={max_age}; HttpOnly; Secure; SameSite=Lax",
            self.name
        )
    }
}

impl Default for SessionCookie {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_COOKIE, crate::tokens::ADMIN_SESSION_TTL)
    }
}
