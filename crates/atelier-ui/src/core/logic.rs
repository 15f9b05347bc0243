//! Pure helpers shared by components and the app shell.

use atelier_core::LikeSnapshot;

/// Same-origin endpoint exposing the OAuth session.
pub const SESSION_ENDPOINT: &str = "/api/auth/session";

const DEV_UI_PORT: &str = "3000";
const DEV_API_PORT: &str = "5000";

/// Route of a design detail page.
#[must_use]
pub fn design_path(design: &str) -> String {
    format!("/designs/{design}")
}

/// Backend API root for a page served from `protocol//host:port`.
///
/// The dev server on :3000 talks to the API on :5000; any other origin
/// serves the API under its own `/api` prefix.
#[must_use]
pub fn derive_api_base_url(protocol: &str, host: &str, port: &str) -> String {
    let port = match port {
        "" => None,
        DEV_UI_PORT => Some(DEV_API_PORT),
        other => Some(other),
    };
    let mut base = format!("{protocol}//{host}");
    if let Some(port) = port {
        base.push(':');
        base.push_str(port);
    }
    base.push_str("/api");
    base
}

/// Post-login destination from a `callbackUrl` value.
///
/// Only same-site absolute paths are honoured; anything else lands on `/`.
#[must_use]
pub fn safe_return_path(callback: Option<&str>) -> String {
    match callback.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/".to_string(),
    }
}

/// Accessible label for the like control.
#[must_use]
pub const fn like_action_label(view: LikeSnapshot) -> &'static str {
    if view.liked { "Unlike design" } else { "Like design" }
}

/// Human-readable like count.
#[must_use]
pub fn like_count_label(count: u64) -> String {
    match count {
        1 => "1 like".to_string(),
        n if n >= 10_000 => format!("{}k likes", n / 1_000),
        n => format!("{n} likes"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_maps_dev_port() {
        assert_eq!(
            derive_api_base_url("http:", "localhost", "3000"),
            "http://localhost:5000/api"
        );
        assert_eq!(
            derive_api_base_url("https:", "shop.example", ""),
            "https://shop.example/api"
        );
        assert_eq!(
            derive_api_base_url("http:", "10.0.0.2", "8443"),
            "http://10.0.0.2:8443/api"
        );
    }

    #[test]
    fn return_path_rejects_foreign_targets() {
        assert_eq!(safe_return_path(Some("/designs/x")), "/designs/x");
        assert_eq!(safe_return_path(Some("//evil.example")), "/");
        assert_eq!(safe_return_path(Some("https://evil.example")), "/");
        assert_eq!(safe_return_path(None), "/");
    }

    #[test]
    fn like_labels() {
        assert_eq!(like_count_label(1), "1 like");
        assert_eq!(like_count_label(42), "42 likes");
        assert_eq!(like_count_label(12_345), "12k likes");
        assert_eq!(
            like_action_label(LikeSnapshot { liked: true, count: 1 }),
            "Unlike design"
        );
    }
}
