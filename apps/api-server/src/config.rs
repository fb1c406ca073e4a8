//! Application configuration loaded from environment variables.

use std::env;
use std::net::IpAddr;
use std::str::FromStr;

use blog_infra::JwtConfig;
use blog_infra::database::DatabaseConfig;
#[cfg(feature = "rate-limit")]
use blog_infra::RateLimitConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    #[cfg(feature = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    pub blog: BlogSettings,
}

/// Knobs of the blog endpoints.
#[derive(Debug, Clone)]
pub struct BlogSettings {
    /// Page size used when a listing request has no `limit`.
    pub page_size: u64,
    /// Upper bound applied to a requested `limit`.
    pub max_page_size: u64,
    /// Whether `POST /api/auth/register` accepts new admins.
    pub allow_registration: bool,
    /// Reverse proxies allowed to name the client in forwarded headers.
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            page_size: 6,
            max_page_size: 50,
            allow_registration: true,
            trusted_proxies: Vec::new(),
        }
    }
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Comma-separated IP list. Unparseable entries are logged and skipped.
fn ip_list(raw: &str) -> Vec<IpAddr> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(ip) => Some(ip),
            Err(_) => {
                tracing::warn!(entry = s, "Ignoring invalid TRUSTED_PROXIES entry");
                None
            }
        })
        .collect()
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut db = DatabaseConfig::new(url);
            db.max_connections = parsed("DB_MAX_CONNECTIONS").unwrap_or(db.max_connections);
            db.min_connections = parsed("DB_MIN_CONNECTIONS").unwrap_or(db.min_connections);
            db
        });

        let defaults = BlogSettings::default();
        let max_page_size = parsed("BLOG_MAX_PAGE_SIZE")
            .filter(|n: &u64| *n > 0)
            .unwrap_or(defaults.max_page_size);
        let blog = BlogSettings {
            page_size: parsed("BLOG_PAGE_SIZE")
                .filter(|n: &u64| *n > 0)
                .unwrap_or(defaults.page_size)
                .min(max_page_size),
            max_page_size,
            allow_registration: env::var("ALLOW_REGISTRATION")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.allow_registration),
            trusted_proxies: env::var("TRUSTED_PROXIES")
                .map(|v| ip_list(&v))
                .unwrap_or(defaults.trusted_proxies),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            database,
            jwt: JwtConfig::from_env(),
            #[cfg(feature = "rate-limit")]
            rate_limit: RateLimitConfig::from_env(),
            blog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_list_skips_garbage() {
        let ips = ip_list(" 10.0.0.1, ,not-an-ip,::1");

        assert_eq!(
            ips,
            vec![
                "10.0.0.1".parse::<IpAddr>().unwrap(),
                "::1".parse::<IpAddr>().unwrap()
            ]
        );
    }
}
