/// Deciding which navigations are worth analyzing
use url::Url;

const ANALYZABLE_PREFIXES: [&str; 2] = ["http://", "https://"];

/// Whether a navigation URL should be sent for analysis.
///
/// Empty or missing URLs and anything outside http/https (about:, chrome:,
/// file:, extension pages, ...) are skipped. The URL is not normalized.
pub fn is_analyzable(url: Option<&str>) -> bool {
    match url {
        Some(url) if !url.is_empty() => ANALYZABLE_PREFIXES
            .iter()
            .any(|prefix| url.starts_with(prefix)),
        _ => false,
    }
}

/// Hostname for log lines, without a leading "www."
pub fn display_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_lowercase))
        .map(|host| host.trim_start_matches("www.").to_string())
        .unwrap_or_else(|| "invalid".to_string())
}
