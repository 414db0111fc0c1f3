mod steam;

use async_trait::async_trait;
use std::time::Duration;

pub use steam::SteamResolver;

/// Result type for resolver operations
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors that can occur while looking up a canonical title
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Lookup request failed: {0}")]
    Request(String),

    #[error("Lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Response parsing failed: {0}")]
    Parse(String),
}

/// Canonical title and link for a free-text item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub name: String,
    pub url: String,
}

/// Looks up the canonical name of a suggested item
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// `Ok(None)` when nothing sufficiently similar was found
    async fn resolve(&self, query: &str) -> ResolveResult<Option<Resolved>>;

    /// Get the name of this resolver
    fn name(&self) -> &str;
}

/// Resolve `query`, treating any failure the same as "no result"
pub async fn resolve_or_none(resolver: &dyn NameResolver, query: &str) -> Option<Resolved> {
    match resolver.resolve(query).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(
                resolver = resolver.name(),
                query,
                "Lookup failed: {}, using raw text",
                e
            );
            None
        }
    }
}

/// Configuration for the external name lookup
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Whether to query the Steam store at all
    pub steam_enabled: bool,
    /// Steam store base URL
    pub steam_base_url: String,
    /// Country code for store results
    pub steam_country: String,
    /// Timeout for one lookup
    pub timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            steam_enabled: true,
            steam_base_url: "https://store.steampowered.com".to_string(),
            steam_country: "US".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let steam_enabled = std::env::var("STEAM_LOOKUP")
            .ok()
            .and_then(|v| {
                let trimmed = v.trim().to_lowercase();
                (!trimmed.is_empty()).then(|| trimmed != "0" && trimmed != "false")
            })
            .unwrap_or(defaults.steam_enabled);

        let steam_base_url = std::env::var("STEAM_BASE_URL")
            .ok()
            .and_then(|url| {
                let trimmed = url.trim().trim_end_matches('/');
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or(defaults.steam_base_url);

        let steam_country = std::env::var("STEAM_COUNTRY")
            .ok()
            .and_then(|cc| {
                let trimmed = cc.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_uppercase())
            })
            .unwrap_or(defaults.steam_country);

        Self {
            steam_enabled,
            steam_base_url,
            steam_country,
            timeout: std::env::var("RESOLVER_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Build the configured resolver, if any
    pub fn build_resolver(&self) -> Option<Box<dyn NameResolver>> {
        if !self.steam_enabled {
            tracing::info!("Steam lookup disabled, votes use the raw text");
            return None;
        }

        match SteamResolver::new(
            self.steam_base_url.clone(),
            self.steam_country.clone(),
            self.timeout,
        ) {
            Ok(resolver) => Some(Box::new(resolver)),
            Err(e) => {
                tracing::warn!("Failed to initialize Steam lookup: {}", e);
                None
            }
        }
    }
}
