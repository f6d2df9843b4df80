//! Auth Metrics
//!
//! Prometheus counters for the auth routes, kept in a dedicated registry so
//! several routers (and tests) can coexist in one process.
//!
//! ## Metrics Provided
//!
//! - `auth_requests_total{event}`: one increment per handled auth event

use derive_more::Display;
use prometheus::{Encoder, IntCounterVec, Registry, TextEncoder, opts};

/// Auth events that are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum AuthCounter {
    #[display("login")]
    Login,
    #[display("login-provider")]
    ProviderLogin,
    #[display("callback")]
    Callback,
    #[display("logout")]
    Logout,
    #[display("logout-unauthenticated")]
    UnauthenticatedLogout,
    #[display("unknown-route")]
    UnknownRoute,
}

impl AuthCounter {
    #[inline]
    pub const fn label(&self) -> &'static str {
        match self {
            AuthCounter::Login => "login",
            AuthCounter::ProviderLogin => "login-provider",
            AuthCounter::Callback => "callback",
            AuthCounter::Logout => "logout",
            AuthCounter::UnauthenticatedLogout => "logout-unauthenticated",
            AuthCounter::UnknownRoute => "unknown-route",
        }
    }
}

#[derive(Clone)]
pub struct AuthMetrics {
    registry: Registry,
    requests: IntCounterVec,
}

impl AuthMetrics {
    /// # Errors
    ///
    /// Returns an error if metrics registration fails.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let requests = IntCounterVec::new(
            opts!("auth_requests_total", "Total number of handled auth events"),
            &["event"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        Ok(Self { registry, requests })
    }

    pub fn add(&self, counter: AuthCounter) {
        self.requests.with_label_values(&[counter.label()]).inc();
    }

    pub fn count(&self, counter: AuthCounter) -> u64 {
        self.requests.with_label_values(&[counter.label()]).get()
    }

    /// Text exposition of every metric in the registry
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_independent() {
        let metrics = AuthMetrics::new().unwrap();
        metrics.add(AuthCounter::Logout);
        metrics.add(AuthCounter::Logout);
        metrics.add(AuthCounter::UnauthenticatedLogout);

        assert_eq!(metrics.count(AuthCounter::Logout), 2);
        assert_eq!(metrics.count(AuthCounter::UnauthenticatedLogout), 1);
        assert_eq!(metrics.count(AuthCounter::Login), 0);
    }

    #[test]
    fn test_render() {
        let metrics = AuthMetrics::new().unwrap();
        metrics.add(AuthCounter::UnknownRoute);
        let text = metrics.render().unwrap();
        assert!(text.contains("auth_requests_total{event=\"unknown-route\"} 1"));
    }

    #[test]
    fn test_label_matches_display() {
        for counter in [AuthCounter::Login, AuthCounter::Callback, AuthCounter::ProviderLogin] {
            assert_eq!(counter.to_string(), counter.label());
        }
    }
}
