//! # Stub Contract
//!
//! The traits any generated (or hand-written) client code must satisfy to be
//! callable through this bridge, and the strongly-typed construction context
//! factories receive.
//!
//! The channel type `S` is opaque to this core: it is carried through the
//! context unexamined, and only concrete [`StubFactory`] implementations
//! place bounds on it.
use crate::BoxError;
use crate::config::{ConsumerConfig, ProviderInfo};
use crate::observer::ResponseObserver;
use crate::options::CallOptions;
use prost_reflect::DynamicMessage;
use std::fmt;
use std::sync::Arc;
use tonic::Status;

/// A callable client bound to one transport channel and one set of call
/// options. Stubs are single-invocation: the registry builds a fresh one per
/// call and it is discarded afterwards.
#[async_trait::async_trait]
pub trait Stub: Send {
    /// Invokes `method` with `request` as its sole argument.
    ///
    /// Unary methods return `Some(response)`. Streaming methods deliver their
    /// results through the observer the stub was constructed with and return
    /// `None` once the call is set up. Any protocol failure, including a
    /// deadline exceeded, surfaces as the `Status` unmodified.
    async fn call(
        &mut self,
        method: &str,
        request: DynamicMessage,
    ) -> Result<Option<DynamicMessage>, Status>;
}

/// Everything a [`StubFactory`] receives to construct a stub.
///
/// `provider` and `consumer` are optional hints: generated code accepts both
/// and may ignore them, and the default invocation path supplies neither.
pub struct StubContext<S> {
    /// The transport channel, passed through unexamined.
    pub channel: S,
    /// Per-call options, carrying the deadline when one was requested.
    pub options: CallOptions,
    /// Optional endpoint hint.
    pub provider: Option<ProviderInfo>,
    /// Optional caller configuration.
    pub consumer: Option<ConsumerConfig>,
    /// The caller's time budget in milliseconds, for generated code that
    /// consumes a relative timeout rather than the options' deadline.
    pub timeout_millis: Option<u64>,
    /// The streaming result receiver, present iff the call is streaming.
    pub observer: Option<Arc<dyn ResponseObserver>>,
}

impl<S: fmt::Debug> fmt::Debug for StubContext<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubContext")
            .field("channel", &self.channel)
            .field("options", &self.options)
            .field("provider", &self.provider)
            .field("consumer", &self.consumer)
            .field("timeout_millis", &self.timeout_millis)
            .field("streaming", &self.observer.is_some())
            .finish()
    }
}

/// Factory producing stubs for one generation scope.
///
/// Implementations are registered in a
/// [`StubRegistry`](crate::registry::StubRegistry) under the scope of the
/// generated code they construct for; registration replaces the runtime
/// factory discovery a reflective implementation would perform.
pub trait StubFactory<S>: Send + Sync {
    /// Builds a stub bound to the context's channel and options.
    fn create(&self, ctx: StubContext<S>) -> Result<Box<dyn Stub>, BoxError>;
}
