use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public base URL used when generating short links, e.g. "https://go.example.com".
    /// Never has a trailing slash. When unset, short links are built from the
    /// request's Host header.
    pub base_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let base_url = std::env::var("BASE_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty());

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            base_url,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Prefix for short URLs: the configured base URL, or `http://<host>`
    /// taken from the request.
    pub fn short_url_base(&self, request_host: Option<&str>) -> String {
        match &self.base_url {
            Some(base) => base.clone(),
            None => format!("http://{}", request_host.unwrap_or("localhost")),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            base_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_from_host_header() {
        let config = AppConfig::default();
        assert_eq!(config.short_url_base(Some("sho.rt:8080")), "http://sho.rt:8080");
        assert_eq!(config.short_url_base(None), "http://localhost");
    }

    #[test]
    fn configured_base_wins() {
        let config = AppConfig {
            base_url: Some("https://go.example.com".into()),
            ..AppConfig::default()
        };
        assert_eq!(config.short_url_base(Some("ignored")), "https://go.example.com");
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }
}
