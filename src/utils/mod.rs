//! Utility functions and helpers.

pub mod http;
pub mod text;

use sha2::{Digest, Sha256};

/// Derive a short, stable identifier from a set of parts.
///
/// Used as the entry id that prefixes every entity unique id, so the same
/// street/heat point/sector always maps to the same entities.
pub fn stable_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(parts.join("|").as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..12].to_string()
}

/// Join a path onto a base URL, keeping any path prefix the base carries.
pub fn join_url(base: &str, path: &str) -> Result<String, url::ParseError> {
    let mut base = url::Url::parse(base)?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path.trim_start_matches('/')).map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_id_is_deterministic() {
        let a = stable_id(&["Str. Lizeanu", "toate", "sector2"]);
        let b = stable_id(&["Str. Lizeanu", "toate", "sector2"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert_ne!(a, stable_id(&["Str. Lizeanu", "toate", "sector3"]));
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://ha.local:8123", "/api/states/sensor.x").unwrap(),
            "http://ha.local:8123/api/states/sensor.x"
        );
        assert_eq!(
            join_url("https://example.com/ha", "api/events/x").unwrap(),
            "https://example.com/ha/api/events/x"
        );
        assert!(join_url("not a url", "api").is_err());
    }
}
