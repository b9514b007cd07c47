//! # Consumer Configuration
//!
//! The caller-side configuration a stub is resolved for, plus the optional
//! provider hint passed through to stub construction. Both are opaque to the
//! invocation path: the only field this core interprets is the proxy type,
//! from which the generation scope of the stub factory is derived.
use crate::request::SERVICE_DELIMITER;

/// Hint about the remote endpoint, forwarded untouched to stub factories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    /// Endpoint address (e.g. `http://localhost:50051`).
    pub address: String,
}

/// Caller/client configuration for one consumed service.
#[derive(Debug, Clone, Default)]
pub struct ConsumerConfig {
    /// Fully qualified name of the generated proxy type, containing the `'$'`
    /// delimiter (e.g. `echo.EchoService$EchoStub`).
    pub proxy_type: String,
    /// Optional endpoint hint, accepted but ignorable by generated code.
    pub provider: Option<ProviderInfo>,
}

impl ConsumerConfig {
    pub fn new(proxy_type: impl Into<String>) -> Self {
        Self {
            proxy_type: proxy_type.into(),
            provider: None,
        }
    }

    /// The enclosing generation scope of the proxy type: the prefix before the
    /// first `'$'`. Stub factories are registered under this scope.
    ///
    /// Returns `None` when the proxy type carries no delimiter, which no
    /// generated proxy type does.
    pub fn stub_scope(&self) -> Option<&str> {
        self.proxy_type
            .split_once(SERVICE_DELIMITER)
            .map(|(scope, _)| scope)
    }
}
