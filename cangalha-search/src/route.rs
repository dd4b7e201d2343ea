//! Alternative access routes and the fetch-with-fallback combinator.
//!
//! Public instant-answer and feed endpoints are frequently blocked or rate
//! limited from some networks. Each lookup is therefore attempted through an
//! ordered list of [`Route`]s: the endpoint itself, then a few public
//! pass-through proxies. [`first_success`] walks that list and stops at the
//! first route yielding a non-empty, well-formed result.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// One way of reaching a target URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Request the target URL as-is.
    Direct,
    /// `api.allorigins.win` — wraps the body in a JSON `{"contents": ...}` envelope.
    AllOrigins,
    /// `corsproxy.io` — target URL appended verbatim.
    CorsProxy,
    /// `api.codetabs.com` — target URL passed percent-encoded.
    CodeTabs,
}

impl Route {
    /// All routes in their default attempt order.
    pub fn all() -> &'static [Route] {
        &[Self::Direct, Self::AllOrigins, Self::CorsProxy, Self::CodeTabs]
    }

    /// Returns the short name of this route.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::AllOrigins => "allorigins",
            Self::CorsProxy => "corsproxy",
            Self::CodeTabs => "codetabs",
        }
    }

    /// Build the URL that fetches `target` through this route.
    pub fn wrap(&self, target: &str) -> String {
        match self {
            Self::Direct => target.to_owned(),
            Self::AllOrigins => format!("https://api.allorigins.win/get?url={}", encode(target)),
            Self::CorsProxy => format!("https://corsproxy.io/?{target}"),
            Self::CodeTabs => format!("https://api.codetabs.com/v1/proxy?quest={}", encode(target)),
        }
    }

    /// Recover the target's body from the raw response of this route.
    ///
    /// Only [`Route::AllOrigins`] wraps the payload; every other route
    /// returns the body unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Parse`] if the envelope is not valid JSON or
    /// carries no `contents`.
    pub fn unwrap_body(&self, body: String) -> Result<String> {
        match self {
            Self::AllOrigins => {
                #[derive(Deserialize)]
                struct Envelope {
                    contents: Option<String>,
                }

                let envelope: Envelope = serde_json::from_str(&body)
                    .map_err(|e| SearchError::Parse(format!("allorigins envelope: {e}")))?;
                envelope
                    .contents
                    .filter(|c| !c.trim().is_empty())
                    .ok_or_else(|| SearchError::Parse("allorigins envelope has no contents".into()))
            }
            _ => Ok(body),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Try `attempt` once per route, in order, returning the first useful result.
///
/// An attempt is useful when it resolves to `Ok(Some(_))`. Both `Ok(None)`
/// (well-formed but empty) and `Err(_)` move on to the next route. Failures
/// are logged at debug level and summarised in the returned error.
///
/// # Errors
///
/// Returns [`SearchError::AllRoutesFailed`] once every route is exhausted.
pub async fn first_success<T, F, Fut>(label: &str, routes: &[Route], mut attempt: F) -> Result<T>
where
    F: FnMut(Route) -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let mut failures = Vec::with_capacity(routes.len());

    for &route in routes {
        match attempt(route).await {
            Ok(Some(value)) => {
                tracing::debug!(source = label, %route, "route succeeded");
                return Ok(value);
            }
            Ok(None) => {
                tracing::debug!(source = label, %route, "route returned nothing useful");
                failures.push(format!("{route}: empty"));
            }
            Err(err) => {
                tracing::debug!(source = label, %route, error = %err, "route failed");
                failures.push(format!("{route}: {err}"));
            }
        }
    }

    Err(SearchError::AllRoutesFailed(format!(
        "{label} ({})",
        failures.join("; ")
    )))
}
