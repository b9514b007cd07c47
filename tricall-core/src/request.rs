//! # Generic Request & Descriptor Resolution
//!
//! This module defines the generic containers a caller uses to describe a
//! remote call, and the [`RequestDescriptor`] resolved from them.
//!
//! ## How resolution works
//!
//! 1. The service name is derived from the interface name by truncating at the
//!    first `'$'`, the delimiter separating the logical interface from its
//!    generated-type suffix.
//! 2. The declared payload type (`arg_signatures[0]`) is looked up in a
//!    `prost_reflect::DescriptorPool` and the payload is checked against it.
//!    A mismatch aborts resolution — there is no partially-valid descriptor.
//! 3. The call is classified by argument count: one argument is a unary call,
//!    two arguments is a streaming call whose second argument is the
//!    [`ResponseObserver`] that will receive results.
use crate::observer::ResponseObserver;
use prost_reflect::{DescriptorPool, DynamicMessage, ReflectMessage};
use std::fmt;
use std::sync::Arc;

/// Delimiter between a logical interface name and its generated-type suffix.
pub const SERVICE_DELIMITER: char = '$';

/// A positional argument of a [`GenericRequest`].
#[derive(Clone)]
pub enum CallArg {
    /// A request payload.
    Message(DynamicMessage),
    /// A streaming result callback.
    Observer(Arc<dyn ResponseObserver>),
}

impl fmt::Debug for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallArg::Message(m) => f.debug_tuple("Message").field(m).finish(),
            CallArg::Observer(_) => f.debug_tuple("Observer").finish(),
        }
    }
}

/// A request object encapsulating all necessary information to perform a call
/// without compile-time knowledge of the generated client code behind it.
#[derive(Debug, Clone)]
pub struct GenericRequest {
    /// Fully qualified logical interface identifier, containing the `'$'`
    /// delimiter (e.g. `echo.EchoService$EchoStub`).
    pub interface_name: String,
    /// Name of the operation to invoke on the resolved stub.
    pub method: String,
    /// Fully qualified type name for each positional argument.
    pub arg_signatures: Vec<String>,
    /// Positional arguments: length 1 for unary calls, length 2 when the
    /// second element is a streaming result observer.
    pub args: Vec<CallArg>,
    /// Caller-declared time budget in seconds. Absent means no deadline.
    pub timeout_secs: Option<u64>,
}

/// The result of a call: a fresh container holding the stub's return value.
///
/// `app_response` is `None` for streaming calls, whose results are delivered
/// through the request's observer instead of a return value.
#[derive(Debug, Clone, Default)]
pub struct GenericResponse {
    pub app_response: Option<DynamicMessage>,
}

/// Errors that can occur while resolving a [`RequestDescriptor`].
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("Interface name '{0}' has no '{SERVICE_DELIMITER}' delimiter")]
    MissingServiceDelimiter(String),
    #[error("Expected 1 or 2 positional arguments, got {0}")]
    UnexpectedArgCount(usize),
    #[error("First argument must be a request payload, not an observer")]
    PayloadExpected,
    #[error("Second argument must be a response observer, not a payload")]
    ObserverExpected,
    #[error("Missing type signature for the request payload")]
    MissingSignature,
    #[error("Request type '{0}' not found in the descriptor pool")]
    UnknownRequestType(String),
    #[error("Request payload type mismatch: expected '{expected}', got '{actual}'")]
    TypeMismatch { expected: String, actual: String },
}

/// Immutable, validated view over a [`GenericRequest`].
///
/// Holding a descriptor guarantees the payload matched its declared type and
/// the argument shape was one of the two supported calling conventions.
#[derive(Clone)]
pub struct RequestDescriptor {
    interface_name: String,
    service_name: String,
    method: String,
    request: DynamicMessage,
    observer: Option<Arc<dyn ResponseObserver>>,
    timeout_secs: Option<u64>,
}

impl RequestDescriptor {
    /// Resolves a generic request against a descriptor pool.
    ///
    /// # Errors
    ///
    /// Fails with [`DescriptorError::TypeMismatch`] when the payload is not an
    /// instance of the type named by its signature, and with the other
    /// [`DescriptorError`] variants on malformed interface names or argument
    /// shapes. A failed resolution never yields a usable descriptor.
    pub fn resolve(
        request: &GenericRequest,
        pool: &DescriptorPool,
    ) -> Result<Self, DescriptorError> {
        let service_name = request
            .interface_name
            .split_once(SERVICE_DELIMITER)
            .map(|(service, _)| service.to_string())
            .ok_or_else(|| {
                DescriptorError::MissingServiceDelimiter(request.interface_name.clone())
            })?;

        if !matches!(request.args.len(), 1 | 2) {
            return Err(DescriptorError::UnexpectedArgCount(request.args.len()));
        }

        let payload = match &request.args[0] {
            CallArg::Message(message) => message.clone(),
            CallArg::Observer(_) => return Err(DescriptorError::PayloadExpected),
        };

        let observer = match request.args.get(1) {
            None => None,
            Some(CallArg::Observer(observer)) => Some(Arc::clone(observer)),
            Some(CallArg::Message(_)) => return Err(DescriptorError::ObserverExpected),
        };

        let signature = request
            .arg_signatures
            .first()
            .ok_or(DescriptorError::MissingSignature)?;

        let declared = pool
            .get_message_by_name(signature)
            .ok_or_else(|| DescriptorError::UnknownRequestType(signature.clone()))?;

        // The checked-conversion counterpart of an instance-of cast: two
        // message descriptors denote the same type iff their full names match.
        let actual = payload.descriptor();
        if actual.full_name() != declared.full_name() {
            return Err(DescriptorError::TypeMismatch {
                expected: declared.full_name().to_string(),
                actual: actual.full_name().to_string(),
            });
        }

        Ok(Self {
            interface_name: request.interface_name.clone(),
            service_name,
            method: request.method.clone(),
            request: payload,
            observer,
            timeout_secs: request.timeout_secs,
        })
    }

    /// The fully qualified logical interface identifier.
    pub fn interface_name(&self) -> &str {
        &self.interface_name
    }

    /// The interface name truncated at the first `'$'`.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The name of the operation to invoke on the resolved stub.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The validated request payload.
    pub fn request(&self) -> &DynamicMessage {
        &self.request
    }

    /// The streaming result observer, present iff the call is streaming.
    pub fn observer(&self) -> Option<&Arc<dyn ResponseObserver>> {
        self.observer.as_ref()
    }

    /// The time budget captured from the request, in seconds.
    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }

    /// Whether results are delivered through an observer rather than a
    /// single return value.
    pub fn is_streaming(&self) -> bool {
        self.observer.is_some()
    }
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("interface_name", &self.interface_name)
            .field("service_name", &self.service_name)
            .field("method", &self.method)
            .field("streaming", &self.is_streaming())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
