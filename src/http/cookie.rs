//! `Set-Cookie` parsing for response assertions.

use std::fmt;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Some(SameSite::Strict),
            "lax" => Some(SameSite::Lax),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

/// Cookie attributes. `None` fields are not compared by assertions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub expires: Option<String>,
    pub max_age: Option<i64>,
    pub secure: Option<bool>,
    pub http_only: Option<bool>,
    pub same_site: Option<SameSite>,
}

impl CookieOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn expires(mut self, expires: impl Into<String>) -> Self {
        self.expires = Some(expires.into());
        self
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = Some(http_only);
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Names of attributes set in `expected` that differ from `self`.
    pub(crate) fn mismatches(&self, expected: &CookieOptions) -> Vec<&'static str> {
        let mut out = Vec::new();
        if expected.domain.is_some()
            && !same_domain(expected.domain.as_deref(), self.domain.as_deref())
        {
            out.push("domain");
        }
        if expected.path.is_some() && expected.path != self.path {
            out.push("path");
        }
        if expected.expires.is_some() && expected.expires != self.expires {
            out.push("expires");
        }
        if expected.max_age.is_some() && expected.max_age != self.max_age {
            out.push("max-age");
        }
        if let Some(secure) = expected.secure {
            if secure != self.secure.unwrap_or(false) {
                out.push("secure");
            }
        }
        if let Some(http_only) = expected.http_only {
            if http_only != self.http_only.unwrap_or(false) {
                out.push("httponly");
            }
        }
        if expected.same_site.is_some() && expected.same_site != self.same_site {
            out.push("samesite");
        }
        out
    }
}

/// Domains compare case-insensitively, ignoring a leading `.`.
fn same_domain(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a
            .trim_start_matches('.')
            .eq_ignore_ascii_case(b.trim_start_matches('.')),
        (None, None) => true,
        _ => false,
    }
}

/// A cookie set by a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

impl ResponseCookie {
    /// Parse one `Set-Cookie` header value. Unknown attributes are ignored.
    pub fn parse(header: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut options = CookieOptions::default();
        for attr in parts {
            let (key, val) = match attr.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim())),
                None => (attr.trim(), None),
            };
            match (key.to_ascii_lowercase().as_str(), val) {
                ("domain", Some(v)) => options.domain = Some(v.trim_start_matches('.').to_string()),
                ("path", Some(v)) => options.path = Some(v.to_string()),
                ("expires", Some(v)) => options.expires = Some(v.to_string()),
                ("max-age", Some(v)) => options.max_age = v.parse().ok(),
                ("secure", _) => options.secure = Some(true),
                ("httponly", _) => options.http_only = Some(true),
                ("samesite", Some(v)) => options.same_site = SameSite::parse(v),
                _ => {}
            }
        }

        Some(Self {
            name: name.to_string(),
            value: value.trim().trim_matches('"').to_string(),
            options,
        })
    }
}

impl fmt::Display for ResponseCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}
