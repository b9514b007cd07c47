//! # Invoker
//!
//! The orchestrator tying descriptor resolution, call options, stub
//! resolution and the call itself together.
//!
//! An invoker is bound to exactly one validated request. Construction performs
//! the payload type check and fails fast, so a held `Invoker` is always fully
//! valid. `invoke` consumes the invoker: a second invocation on the same
//! request requires constructing a new one, which re-binds fresh call options
//! and a fresh stub.
use crate::config::ConsumerConfig;
use crate::options::CallOptions;
use crate::registry::{StubRegistry, StubResolveError};
use crate::request::{DescriptorError, GenericRequest, GenericResponse, RequestDescriptor};
use crate::stub::StubContext;
use prost_reflect::DescriptorPool;
use std::sync::Arc;
use tonic::Status;

/// Errors that can occur during `invoke`.
///
/// Descriptor errors cannot appear here: they are raised by construction,
/// before an invoker exists.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error(transparent)]
    Stub(#[from] StubResolveError),
    #[error("Call failed: '{0}'")]
    Call(#[source] Status),
}

/// Single-use bridge from one generic request to one protocol call.
pub struct Invoker<S> {
    descriptor: RequestDescriptor,
    channel: S,
    registry: Arc<StubRegistry<S>>,
}

impl<S> Invoker<S> {
    /// Validates `request` and binds the invoker to `channel` and `registry`.
    ///
    /// # Errors
    ///
    /// Any [`DescriptorError`], in particular a payload type mismatch. A
    /// failed construction never yields a partially-valid invoker.
    pub fn new(
        request: &GenericRequest,
        channel: S,
        registry: Arc<StubRegistry<S>>,
        pool: &DescriptorPool,
    ) -> Result<Self, DescriptorError> {
        let descriptor = RequestDescriptor::resolve(request, pool)?;
        Ok(Self {
            descriptor,
            channel,
            registry,
        })
    }

    /// The validated request descriptor this invoker is bound to.
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Performs the call: builds call options from `timeout_secs`, resolves a
    /// stub for `config`, invokes the target method with the request payload,
    /// and wraps the return value into a fresh [`GenericResponse`].
    ///
    /// `timeout_secs` is authoritative; when absent, the timeout captured from
    /// the request applies. For streaming calls the response container carries
    /// no payload — results flow through the descriptor's observer.
    ///
    /// # Errors
    ///
    /// Stub resolution and construction failures surface as
    /// [`InvokeError::Stub`]; any protocol failure, including a deadline
    /// exceeded, surfaces unmodified as [`InvokeError::Call`]. No retry, no
    /// partially populated response.
    pub async fn invoke(
        self,
        config: &ConsumerConfig,
        timeout_secs: Option<u64>,
    ) -> Result<GenericResponse, InvokeError> {
        let timeout_secs = timeout_secs.or(self.descriptor.timeout_secs());
        let options = CallOptions::for_timeout(timeout_secs);

        let ctx = StubContext {
            channel: self.channel,
            options,
            provider: None,
            consumer: None,
            timeout_millis: timeout_secs.map(|secs| secs * 1_000),
            observer: self.descriptor.observer().cloned(),
        };

        let mut stub = self.registry.resolve(config, ctx)?;

        tracing::debug!(
            service = self.descriptor.service_name(),
            method = self.descriptor.method(),
            streaming = self.descriptor.is_streaming(),
            "dispatching call"
        );

        let app_response = stub
            .call(self.descriptor.method(), self.descriptor.request().clone())
            .await
            .map_err(InvokeError::Call)?;

        Ok(GenericResponse { app_response })
    }
}
