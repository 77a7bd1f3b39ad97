// Backend address resolution

use anyhow::{Context, Result};
use reqwest::Url;

/// Backend address used while developing against a local server
pub const LOCAL_API_BASE: &str = "http://localhost:8000";

/// Path of the generation endpoint, relative to the base address
pub const GENERATE_PATH: &str = "/api/generate";

const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Whether a hostname refers to the local machine
pub fn is_loopback_host(hostname: &str) -> bool {
    LOOPBACK_HOSTS.contains(&hostname)
}

/// Pick the backend base address for a page served from `hostname` at `origin`.
///
/// Loopback hosts talk to the local development backend; everything else
/// talks to its own origin (one trailing slash removed).
pub fn resolve_api_base_for(hostname: &str, origin: &str) -> String {
    if is_loopback_host(hostname) {
        return LOCAL_API_BASE.to_string();
    }
    origin.strip_suffix('/').unwrap_or(origin).to_string()
}

/// Same as [`resolve_api_base_for`], reading the hostname out of `origin`
pub fn resolve_api_base(origin: &str) -> Result<String> {
    let url = Url::parse(origin).with_context(|| format!("Invalid origin URL: {}", origin))?;
    let hostname = url.host_str().unwrap_or_default();
    Ok(resolve_api_base_for(hostname, origin))
}

/// Full URL of the generation endpoint under `base`
pub fn generate_url(base: &str) -> String {
    format!("{}{}", base, GENERATE_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_loopback_hosts() {
        assert!(is_loopback_host("localhost"));
        assert!(is_loopback_host("127.0.0.1"));
        assert!(!is_loopback_host("example.com"));
        assert!(!is_loopback_host("localhost.example.com"));
        assert!(!is_loopback_host(""));
    }

    #[test]
    fn test_resolve_localhost_origin() {
        assert_eq!(
            resolve_api_base("http://localhost:3000").unwrap(),
            "http://localhost:8000"
        );
        assert_eq!(
            resolve_api_base("http://127.0.0.1:5500/").unwrap(),
            "http://localhost:8000"
        );
    }

    #[test]
    fn test_resolve_remote_origin_strips_trailing_slash() {
        assert_eq!(
            resolve_api_base("https://slides.example.com/").unwrap(),
            "https://slides.example.com"
        );
        assert_eq!(
            resolve_api_base("https://slides.example.com").unwrap(),
            "https://slides.example.com"
        );
    }

    #[test]
    fn test_resolve_invalid_origin() {
        let err = resolve_api_base("not a url").unwrap_err();
        assert!(err.to_string().contains("Invalid origin URL"));
    }

    #[test]
    fn test_generate_url() {
        assert_eq!(
            generate_url("http://localhost:8000"),
            "http://localhost:8000/api/generate"
        );
        assert_eq!(
            generate_url("https://slides.example.com"),
            "https://slides.example.com/api/generate"
        );
    }

    proptest! {
        #[test]
        fn prop_loopback_always_maps_to_local_base(
            host in prop::sample::select(vec!["localhost", "127.0.0.1"]),
            port in 1u16..=65535,
        ) {
            let origin = format!("http://{}:{}", host, port);
            prop_assert_eq!(resolve_api_base(&origin).unwrap(), LOCAL_API_BASE);
        }

        #[test]
        fn prop_remote_host_maps_to_own_origin(
            host in "[a-k][a-z0-9]{0,12}\\.(com|org|net|io)",
            slash in any::<bool>(),
        ) {
            let origin = format!("https://{}", host);
            let input = if slash { format!("{}/", origin) } else { origin.clone() };
            prop_assert_eq!(resolve_api_base_for(&host, &input), origin);
        }
    }
}
