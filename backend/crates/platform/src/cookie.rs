//! Cookie Handling
//!
//! Outbound `Cookie` header composition and `Set-Cookie` lookup on responses.

use reqwest::header::{self, HeaderMap, HeaderValue, InvalidHeaderValue};

/// A single `name=value` cookie pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePair {
    pub name: String,
    pub value: String,
}

impl CookiePair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// `name=value`
    pub fn to_header_fragment(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Join cookie fragments into one `Cookie` header value
///
/// Fragments are taken verbatim, so an already formatted `name=value`
/// string can be mixed with [`CookiePair::to_header_fragment`] output.
pub fn build_cookie_header<I, S>(fragments: I) -> Result<HeaderValue, InvalidHeaderValue>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = fragments
        .into_iter()
        .map(|fragment| fragment.as_ref().trim().to_string())
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("; ");

    HeaderValue::from_str(&joined)
}

/// Find a cookie value in the `Set-Cookie` headers of a response
///
/// Attributes after the first `;` (Path, HttpOnly, ...) are ignored.
pub fn find_set_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| {
            let pair = cookie.split(';').next()?;
            let (key, value) = pair.trim().split_once('=')?;

            if key == name {
                Some(value.to_string())
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_cookie_header() {
        let session = CookiePair::new("PHPSESSID", "abc123");
        let value =
            build_cookie_header(["acceptCookies=true".to_string(), session.to_header_fragment()])
                .unwrap();

        assert_eq!(value.to_str().unwrap(), "acceptCookies=true; PHPSESSID=abc123");
    }

    #[test]
    fn test_build_cookie_header_skips_empty_fragments() {
        let value = build_cookie_header(["acceptCookies=true", " ", "a=b"]).unwrap();
        assert_eq!(value.to_str().unwrap(), "acceptCookies=true; a=b");
    }

    #[test]
    fn test_build_cookie_header_rejects_control_chars() {
        assert!(build_cookie_header(["a=b\n"]).is_ok()); // trimmed
        assert!(build_cookie_header(["a=\u{7f}b"]).is_err());
    }

    #[test]
    fn test_find_set_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_static("lang=fr; Path=/"),
        );
        headers.append(
            header::SET_COOKIE,
            HeaderValue::from_static("PHPSESSID=abc123; path=/; HttpOnly"),
        );

        assert_eq!(
            find_set_cookie(&headers, "PHPSESSID"),
            Some("abc123".to_string())
        );
        assert_eq!(find_set_cookie(&headers, "lang"), Some("fr".to_string()));
        assert_eq!(find_set_cookie(&headers, "missing"), None);
    }
}
