//! Route table for verified App Proxy requests.

use crate::clients::HttpMethod;

/// An action a customer can take on one of their subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubscriptionAction {
    /// Pause the subscription.
    Pause,
    /// Resume a paused subscription.
    Resume,
    /// Skip the next order.
    Skip,
}

impl SubscriptionAction {
    /// Parses an action path segment.
    #[must_use]
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "pause" => Some(Self::Pause),
            "resume" => Some(Self::Resume),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }

    /// Returns the action name used in paths and responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Skip => "skip",
        }
    }

    /// Returns the JSON body sent upstream for this action.
    #[must_use]
    pub fn upstream_body(&self) -> Option<serde_json::Value> {
        match self {
            Self::Pause => Some(serde_json::json!({ "reason": "customer_request" })),
            Self::Resume => None,
            Self::Skip => Some(serde_json::json!({ "count": 1 })),
        }
    }
}

/// A route the gate can dispatch a verified request to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// `/ping`, any method.
    Ping,
    /// `GET /overview`
    Overview,
    /// `GET /subscriptions`
    ListSubscriptions,
    /// `POST /subscriptions/{id}/{action}`
    Action {
        /// The decoded subscription id.
        id: String,
        /// The requested action.
        action: SubscriptionAction,
    },
}

impl Route {
    /// Matches a request method and a prefix-stripped path.
    ///
    /// Returns `None` when no route matches. The `{id}` segment must be a
    /// single non-empty segment; it is percent-decoded before being returned.
    #[must_use]
    pub fn resolve(method: &str, path: &str) -> Option<Self> {
        if path == "/ping" {
            return Some(Self::Ping);
        }

        let method = HttpMethod::parse(method)?;
        let segments: Vec<&str> = path.strip_prefix('/')?.split('/').collect();

        match (method, segments.as_slice()) {
            (HttpMethod::Get, ["overview"]) => Some(Self::Overview),
            (HttpMethod::Get, ["subscriptions"]) => Some(Self::ListSubscriptions),
            (HttpMethod::Post, ["subscriptions", id, action]) if !id.is_empty() => {
                let action = SubscriptionAction::parse(action)?;
                let id = urlencoding::decode(id).ok()?.into_owned();
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                Some(Self::Action { id, action })
            }
            _ => None,
        }
    }
}

/// Builds the upstream path listing a customer's subscriptions.
#[must_use]
pub fn subscriptions_path(customer_id: &str) -> String {
    format!(
        "/external/v2/subscriptions?customerId={}",
        urlencoding::encode(customer_id)
    )
}

/// Builds the upstream path for an action on one subscription.
#[must_use]
pub fn action_path(id: &str, action: SubscriptionAction) -> String {
    format!(
        "/external/v2/subscriptions/{}/{}",
        urlencoding::encode(id),
        action.as_str()
    )
}
