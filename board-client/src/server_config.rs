use crate::config::ClientConfig;

/// Environment variable overriding the server root
pub const SERVER_URL_ENV: &str = "BOARD_SERVER_URL";

/// Server used when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Determine the server root based on priority:
/// 1. CLI argument (highest priority)
/// 2. Environment variable `BOARD_SERVER_URL`
/// 3. Saved configuration file
/// 4. Default (lowest priority)
pub fn determine_server_url(cli_override: Option<String>, config: &ClientConfig) -> String {
    if let Some(url) = cli_override {
        return url;
    }

    if let Ok(url) = std::env::var(SERVER_URL_ENV) {
        if !url.trim().is_empty() {
            return url;
        }
    }

    if let Some(url) = &config.server_url {
        return url.clone();
    }

    DEFAULT_SERVER_URL.to_string()
}

/// API root for a server root: trailing slash stripped, `/api` appended
pub fn api_base_url(server_url: &str) -> String {
    let base = server_url.trim().trim_end_matches('/');
    if base.ends_with("/api") {
        base.to_string()
    } else {
        format!("{}/api", base)
    }
}
