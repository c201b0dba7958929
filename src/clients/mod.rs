//! HTTP client types for the subscription management API.
//!
//! This module provides the outbound HTTP layer the gate uses once a
//! request has been authenticated. It handles request validation, bearer
//! authentication, retry logic, and error message extraction.
//!
//! # Overview
//!
//! - [`SubscriptionApi`]: The capability the gate depends on
//! - [`SubscriptionClient`]: The `reqwest` implementation of [`SubscriptionApi`]
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`DataType`]: Content types for request bodies
//!
//! # Retry Behavior
//!
//! - **429 (Rate Limited)**: Retries using `Retry-After` header value (capped at 60 seconds), or 1 second if not present
//! - **500 (Server Error)**: Retries with fixed 1-second delay
//! - **Other errors (4xx)**: Returns immediately without retry
//!
//! The default `tries` is 1, meaning no automatic retries. Configure via
//! [`SubscriptionClient::with_tries`] or [`HttpRequestBuilder::tries`].

mod errors;
mod http_request;
mod http_response;
mod subscription_client;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
pub use subscription_client::{SubscriptionApi, SubscriptionClient, MAX_RETRY_WAIT_TIME, RETRY_WAIT_TIME, SDK_VERSION};
