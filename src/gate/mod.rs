//! The request gate: verification first, then dispatch.
//!
//! [`ProxyGate`] composes the pieces of this crate into one entry point.
//! Given a request method and target it:
//!
//! 1. verifies the App Proxy signature and identity parameters
//! 2. resolves a [`Route`] from the prefix-stripped path
//! 3. calls the subscription API for business routes
//! 4. renders a [`GateResponse`]
//!
//! A rejected request never reaches step 2, so no route is dispatched and no
//! upstream call is made for it.
//!
//! # Example
//!
//! ```rust,ignore
//! use app_proxy::{ProxyConfig, ProxyGate};
//!
//! let gate = ProxyGate::new(ProxyConfig::from_env()?)?;
//! let response = gate.handle("GET", "/api/tg-portal/overview?shop=...&signature=...").await;
//! println!("{} {}", response.status, response.body);
//! ```

mod response;
mod routes;

use std::sync::Arc;

use serde_json::{json, Value};

use crate::clients::{HttpError, HttpMethod, SubscriptionApi, SubscriptionClient};
use crate::config::ProxyConfig;
use crate::proxy::{verify_proxy_request, ProxyContext, ProxyError, ProxyRequest, PARAM_CUSTOMER_ID};

pub use response::{GateResponse, CONTENT_TYPE};
pub use routes::{action_path, subscriptions_path, Route, SubscriptionAction};

/// Message returned when a business route is hit without an API configured.
pub const API_NOT_CONFIGURED: &str = "subscription API is not configured";

/// Authenticates App Proxy requests and dispatches them to routes.
///
/// The gate holds read-only configuration and is safe to share across
/// tasks (wrap it in an [`Arc`] or a framework's shared state).
#[derive(Debug)]
pub struct ProxyGate<A = SubscriptionClient> {
    config: Arc<ProxyConfig>,
    api: Option<A>,
}

// Verify ProxyGate is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ProxyGate>();
};

impl ProxyGate<SubscriptionClient> {
    /// Creates a gate whose subscription API client is built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the HTTP client cannot be created.
    pub fn new(config: ProxyConfig) -> Result<Self, HttpError> {
        let api = SubscriptionClient::from_config(&config)?;
        Ok(Self::with_api(config, api))
    }
}

impl<A: SubscriptionApi> ProxyGate<A> {
    /// Creates a gate with an explicit subscription API implementation.
    ///
    /// Pass `None` to serve only `/ping`; business routes then fail with a
    /// `500`.
    #[must_use]
    pub fn with_api(config: ProxyConfig, api: Option<A>) -> Self {
        Self {
            config: Arc::new(config),
            api,
        }
    }

    /// Returns the gate's configuration.
    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Returns the subscription API, if one is configured.
    #[must_use]
    pub const fn api(&self) -> Option<&A> {
        self.api.as_ref()
    }

    /// Handles one proxied request.
    ///
    /// `target` is the request target as received: the path, followed by
    /// `?` and the raw, undecoded query string.
    pub async fn handle(&self, method: &str, target: &str) -> GateResponse {
        let request = ProxyRequest::new(method, target);

        let context = match verify_proxy_request(&self.config, &request) {
            Ok(context) => context,
            Err(error) => return GateResponse::from_error(&error),
        };

        match self.dispatch(request.method(), &context).await {
            Ok(body) => GateResponse::ok(body),
            Err(error) => {
                tracing::warn!(
                    kind = error.kind(),
                    shop = %context.shop(),
                    path = %context.path(),
                    error = %error,
                    "App Proxy request failed"
                );
                GateResponse::from_error(&error)
            }
        }
    }

    async fn dispatch(&self, method: &str, context: &ProxyContext) -> Result<Value, ProxyError> {
        let route =
            Route::resolve(method, context.path()).ok_or_else(|| ProxyError::UnknownRoute {
                method: method.to_string(),
                path: context.path().to_string(),
            })?;

        tracing::trace!(route = ?route, shop = %context.shop(), "Dispatching App Proxy request");

        match route {
            Route::Ping => Ok(json!({
                "ok": true,
                "shop": context.shop(),
                "logged_in_customer_id": context.logged_in_customer_id(),
            })),
            Route::Overview => {
                let (customer_id, api) = self.business(context)?;
                let subscriptions = api
                    .call(&subscriptions_path(customer_id), HttpMethod::Get, None)
                    .await?;
                Ok(json!({
                    "ok": true,
                    "customer_id": customer_id,
                    "subscriptions": subscriptions,
                }))
            }
            Route::ListSubscriptions => {
                let (customer_id, api) = self.business(context)?;
                let subscriptions = api
                    .call(&subscriptions_path(customer_id), HttpMethod::Get, None)
                    .await?;
                Ok(json!({ "ok": true, "subscriptions": subscriptions }))
            }
            Route::Action { id, action } => {
                let (_, api) = self.business(context)?;
                api.call(
                    &action_path(&id, action),
                    HttpMethod::Post,
                    action.upstream_body(),
                )
                .await?;
                Ok(json!({ "ok": true, "id": id, "action": action.as_str() }))
            }
        }
    }

    /// Resolves what every business route needs: the customer it acts for
    /// and a configured subscription API.
    fn business<'a>(&'a self, context: &'a ProxyContext) -> Result<(&'a str, &'a A), ProxyError> {
        let customer_id =
            context
                .effective_customer_id()
                .ok_or(ProxyError::MissingRequiredParameter {
                    name: PARAM_CUSTOMER_ID,
                })?;
        let api = self
            .api
            .as_ref()
            .ok_or_else(|| ProxyError::UpstreamCallFailure {
                message: API_NOT_CONFIGURED.to_string(),
            })?;
        Ok((customer_id, api))
    }
}
