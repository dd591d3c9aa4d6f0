//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Host (Telegram Mini App) capabilities and haptics
//! - Launch parameters such as the referral code

pub mod telegram;

pub use telegram::HostCapabilities;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Decoded value of `name` in a `?a=1&b=2` query string
pub fn query_param(search: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Referral code from the page URL (`?ref=CODE`)
#[cfg(target_arch = "wasm32")]
pub fn referral_code() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    web_sys::UrlSearchParams::new_with_str(&search)
        .ok()?
        .get("ref")
        .filter(|code| !code.is_empty())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn referral_code() -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param() {
        assert_eq!(query_param("?ref=ABC&x=1", "ref").as_deref(), Some("ABC"));
        assert_eq!(query_param("x=1&ref=Q", "ref").as_deref(), Some("Q"));
        assert_eq!(query_param("?ref=", "ref"), None);
        assert_eq!(query_param("?flag", "ref"), None);
        assert_eq!(query_param("", "ref"), None);
    }

    #[test]
    fn test_query_param_decodes() {
        assert_eq!(query_param("?ref=AB%2BC", "ref").as_deref(), Some("AB+C"));
        assert_eq!(query_param("?ref=A+B", "ref").as_deref(), Some("A B"));
        assert_eq!(query_param("?r%65f=X", "ref").as_deref(), Some("X"));
    }

    #[test]
    fn test_clock_is_after_epoch() {
        assert!(now_ms() > 0.0);
    }
}
