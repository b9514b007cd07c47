//! # Stub Registry
//!
//! An explicit mapping from a consumer configuration's generation scope to the
//! [`StubFactory`] able to build stubs for it.
//!
//! The registry is populated once, at startup or code-generation time, and
//! read on every invocation. A missing entry is a resolution failure surfaced
//! to the caller, never a silent fallback.
use crate::BoxError;
use crate::config::ConsumerConfig;
use crate::stub::{Stub, StubContext, StubFactory};
use std::collections::HashMap;
use std::sync::Arc;

/// Errors that can occur while resolving a stub for a configuration.
#[derive(Debug, thiserror::Error)]
pub enum StubResolveError {
    #[error("Proxy type '{0}' has no generation scope")]
    MissingScope(String),
    #[error("No stub factory registered for scope '{0}'")]
    FactoryNotFound(String),
    #[error("Stub factory for scope '{scope}' failed: '{source}'")]
    ConstructionFailed {
        scope: String,
        #[source]
        source: BoxError,
    },
}

/// Registry of stub factories, keyed by generation scope.
pub struct StubRegistry<S> {
    factories: HashMap<String, Arc<dyn StubFactory<S>>>,
}

impl<S> Default for StubRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StubRegistry<S> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers `factory` under `scope`, replacing any previous entry.
    pub fn register(&mut self, scope: impl Into<String>, factory: Arc<dyn StubFactory<S>>) {
        self.factories.insert(scope.into(), factory);
    }

    /// Whether a factory is registered for `scope`.
    pub fn contains(&self, scope: &str) -> bool {
        self.factories.contains_key(scope)
    }

    /// Resolves a fresh stub for `config`, bound to the channel and options
    /// carried by `ctx`.
    ///
    /// # Errors
    ///
    /// * [`StubResolveError::MissingScope`] - the proxy type has no delimiter.
    /// * [`StubResolveError::FactoryNotFound`] - no factory for the scope.
    /// * [`StubResolveError::ConstructionFailed`] - the factory itself failed.
    pub fn resolve(
        &self,
        config: &ConsumerConfig,
        ctx: StubContext<S>,
    ) -> Result<Box<dyn Stub>, StubResolveError> {
        let scope = config
            .stub_scope()
            .ok_or_else(|| StubResolveError::MissingScope(config.proxy_type.clone()))?;

        let factory = self
            .factories
            .get(scope)
            .ok_or_else(|| StubResolveError::FactoryNotFound(scope.to_string()))?;

        tracing::debug!(scope, "resolving stub");

        factory
            .create(ctx)
            .map_err(|source| StubResolveError::ConstructionFailed {
                scope: scope.to_string(),
                source,
            })
    }
}
