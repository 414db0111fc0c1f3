use super::*;
use crate::state::fuzzy::{similarity, MATCH_THRESHOLD};
use serde::Deserialize;
use std::time::Instant;

/// Steam store search lookup
pub struct SteamResolver {
    base_url: String,
    country: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl SteamResolver {
    pub fn new(base_url: String, country: String, timeout: Duration) -> ResolveResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; tallybot)")
            .build()
            .map_err(|e| ResolveError::Request(e.to_string()))?;

        Ok(Self {
            base_url,
            country,
            timeout,
            client,
        })
    }

    fn app_url(&self, id: u64) -> String {
        format!("{}/app/{}/", self.base_url, id)
    }
}

#[derive(Debug, Deserialize)]
struct StoreSearchResponse {
    #[serde(default)]
    items: Vec<StoreSearchItem>,
}

#[derive(Debug, Deserialize)]
struct StoreSearchItem {
    id: u64,
    name: String,
}

/// Accept the top search hit only if its title resembles the query
fn pick_result(query: &str, response: StoreSearchResponse) -> Option<(u64, String)> {
    let top = response.items.into_iter().next()?;
    let title = top.name.trim().to_string();
    if similarity(query, &title) >= MATCH_THRESHOLD {
        Some((top.id, title))
    } else {
        tracing::debug!(query, title = %title, "Top store result too different, ignoring");
        None
    }
}

#[async_trait]
impl NameResolver for SteamResolver {
    async fn resolve(&self, query: &str) -> ResolveResult<Option<Resolved>> {
        let start = Instant::now();
        let url = format!("{}/api/storesearch/", self.base_url);

        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .get(&url)
                .query(&[("term", query), ("l", "english"), ("cc", self.country.as_str())])
                .send(),
        )
        .await
        .map_err(|_| ResolveError::Timeout(self.timeout))?
        .map_err(|e| ResolveError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ResolveError::Request(format!(
                "Steam store returned status: {}",
                response.status()
            )));
        }

        let search: StoreSearchResponse = response
            .json()
            .await
            .map_err(|e| ResolveError::Parse(e.to_string()))?;

        let resolved = pick_result(query, search).map(|(id, name)| Resolved {
            url: self.app_url(id),
            name,
        });

        tracing::debug!(
            query,
            found = resolved.is_some(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Steam lookup finished"
        );
        Ok(resolved)
    }

    fn name(&self) -> &str {
        "steam"
    }
}
