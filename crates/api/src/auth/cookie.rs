//! The session cookie: building `Set-Cookie` values and reading the token
//! back out of `Cookie` headers.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Default cookie name.
const DEFAULT_COOKIE_NAME: &str = "token";

/// How the session cookie is emitted.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    /// Add the `Secure` attribute (HTTPS deployments).
    pub secure: bool,
}

impl CookieConfig {
    /// Load cookie settings from environment variables.
    ///
    /// | Env Var            | Default |
    /// |--------------------|---------|
    /// | `AUTH_COOKIE_NAME` | `token` |
    /// | `COOKIE_SECURE`    | `false` |
    pub fn from_env() -> Self {
        let name = std::env::var("AUTH_COOKIE_NAME")
            .ok()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());
        let secure = std::env::var("COOKIE_SECURE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self { name, secure }
    }

    /// `Set-Cookie` value carrying `token` for `max_age_secs`.
    pub fn session(&self, token: &str, max_age_secs: i64) -> String {
        self.build(token, max_age_secs)
    }

    /// `Set-Cookie` value that removes the session cookie.
    pub fn cleared(&self) -> String {
        self.build("", 0)
    }

    fn build(&self, value: &str, max_age_secs: i64) -> String {
        let mut cookie = format!(
            "{}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}",
            self.name
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            secure: false,
        }
    }
}

/// Value of cookie `name` across all `Cookie` headers, if present and
/// non-empty.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(key, value)| (key, value.trim()))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let config = CookieConfig::default();
        assert_eq!(
            config.session("abc", 60),
            "token=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=60"
        );

        let secure = CookieConfig {
            name: "sid".into(),
            secure: true,
        };
        assert!(secure.cleared().starts_with("sid=; "));
        assert!(secure.cleared().contains("Max-Age=0"));
        assert!(secure.cleared().ends_with("; Secure"));
    }

    #[test]
    fn reads_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; token=abc.def.ghi"));
        assert_eq!(read_cookie(&headers, "token"), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn reads_across_multiple_headers_and_skips_empty() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("token="));
        assert_eq!(read_cookie(&headers, "token"), None);

        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("token=xyz"));
        assert_eq!(read_cookie(&headers, "token"), Some("xyz"));
    }
}
