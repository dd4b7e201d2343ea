//! Shared HTTP client with User-Agent rotation for source requests.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::route::Route;
use rand::seq::SliceRandom;
use std::time::Duration;

/// Browser User-Agents, one picked per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Mobile Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0",
];

/// Client shared by every route of one source.
///
/// # Errors
///
/// Returns [`SearchError::Http`] if the TLS backend cannot be initialised.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| random_user_agent().to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| SearchError::Http(format!("client setup: {e}")))
}

/// One of the built-in User-Agents, uniformly at random.
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// GET `target` through `route` and return the target's body.
///
/// # Errors
///
/// Returns [`SearchError::Http`] on transport failure or a non-2xx status,
/// and [`SearchError::Parse`] if the route's envelope cannot be unwrapped.
pub async fn fetch_text(
    client: &reqwest::Client,
    route: Route,
    target: &str,
    accept: &str,
) -> Result<String, SearchError> {
    let url = route.wrap(target);
    tracing::trace!(%route, url = %url, "fetching");

    let body = client
        .get(&url)
        .header("Accept", accept)
        .send()
        .await
        .map_err(|e| SearchError::Http(format!("request via {route} failed: {e}")))?
        .error_for_status()
        .map_err(|e| SearchError::Http(format!("{route} HTTP error: {e}")))?
        .text()
        .await
        .map_err(|e| SearchError::Http(format!("{route} response read failed: {e}")))?;

    route.unwrap_body(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_only_yields_known_agents() {
        for _ in 0..16 {
            assert!(USER_AGENTS.contains(&random_user_agent()));
        }
    }

    #[test]
    fn client_builds_with_default_and_custom_agent() {
        assert!(build_client(&SearchConfig::default()).is_ok());
        let config = SearchConfig {
            user_agent: Some("CangalhaTest/1.0".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }
}
