//! Country allow-list gate for the cards routes.
//!
//! Requests must carry an `X-Country-Code` header whose value exactly matches
//! one of the configured codes. Anything else is answered with `403` and an
//! empty body before the body is read or storage is touched.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{collections::BTreeSet, sync::Arc};
use tracing::debug;

pub const COUNTRY_CODE_HEADER: &str = "x-country-code";

pub const DEFAULT_ALLOWED_COUNTRIES: [&str; 3] = ["UA", "US", "UK"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryGate {
    allowed: BTreeSet<String>,
}

impl CountryGate {
    /// Build a gate from country codes. Blank codes are dropped so an empty
    /// header can never match.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: codes
                .into_iter()
                .map(|code| {
                    let code: String = code.into();
                    code.trim().to_string()
                })
                .filter(|code| !code.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_allowed_code(&self, code: &str) -> bool {
        self.allowed.contains(code)
    }

    /// Case-sensitive check of the first `X-Country-Code` value.
    #[must_use]
    pub fn is_allowed(&self, headers: &HeaderMap) -> bool {
        headers
            .get(COUNTRY_CODE_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|code| self.is_allowed_code(code))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }
}

impl Default for CountryGate {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_COUNTRIES)
    }
}

/// axum middleware rejecting requests from countries outside the allow-list.
pub async fn require_country(
    State(gate): State<Arc<CountryGate>>,
    request: Request,
    next: Next,
) -> Response {
    if gate.is_allowed(request.headers()) {
        return next.run(request).await;
    }

    debug!(
        country = request
            .headers()
            .get(COUNTRY_CODE_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default(),
        "country not allowed"
    );

    StatusCode::FORBIDDEN.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::HeaderValue,
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    fn headers(code: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COUNTRY_CODE_HEADER, HeaderValue::from_static(code));
        headers
    }

    #[test]
    fn default_allows_three_codes() {
        let gate = CountryGate::default();
        assert_eq!(gate.codes().collect::<Vec<_>>(), vec!["UA", "UK", "US"]);

        for code in DEFAULT_ALLOWED_COUNTRIES {
            assert!(gate.is_allowed(&headers(code)), "{code} should be allowed");
        }
    }

    #[test]
    fn rejects_missing_empty_and_unknown_codes() {
        let gate = CountryGate::default();
        assert!(!gate.is_allowed(&HeaderMap::new()));
        assert!(!gate.is_allowed(&headers("")));
        assert!(!gate.is_allowed(&headers("PL")));
        assert!(!gate.is_allowed(&headers("ua")));
        assert!(!gate.is_allowed(&headers(" UA")));
    }

    #[test]
    fn configured_codes_replace_defaults() {
        let gate = CountryGate::new(["PL", " ", "DE "]);
        assert!(gate.is_allowed(&headers("PL")));
        assert!(gate.is_allowed(&headers("DE")));
        assert!(!gate.is_allowed(&headers("UA")));
        assert!(!gate.is_allowed(&headers("")));
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(
                Arc::new(CountryGate::default()),
                require_country,
            ))
    }

    #[tokio::test]
    async fn middleware_short_circuits_with_forbidden() -> Result<()> {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert!(body.is_empty());

        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("X-Country-Code", "US")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }
}
