//! # Tricall Core
//!
//! `tricall-core` bridges a generic, reflection-style RPC request (an interface
//! name, a method name, typed argument signatures and positional arguments) to a
//! strongly-typed gRPC stub, without compile-time knowledge of the generated
//! client code behind that stub.
//!
//! ## Key Components
//!
//! * **[`request::GenericRequest`] & [`request::GenericResponse`]:** The generic
//!   containers callers use to describe a call and receive its result. Payloads
//!   are `prost_reflect::DynamicMessage` values validated against their declared
//!   schema at descriptor-resolution time.
//! * **[`invoker::Invoker`]:** The orchestrator. It validates the request into a
//!   [`request::RequestDescriptor`] at construction time (failing fast on a type
//!   mismatch), and on `invoke()` builds call options, resolves a stub from the
//!   registry and performs the call.
//! * **[`registry::StubRegistry`]:** An explicit mapping from a consumer
//!   configuration's generation scope to the [`stub::StubFactory`] able to build
//!   a callable stub for it. Registration replaces runtime factory discovery.
//!
//! ## Calling conventions
//!
//! A request carrying a single argument is a **unary** call: the stub's return
//! value becomes the response payload. A request carrying two arguments is a
//! **streaming** call: the second argument is a [`observer::ResponseObserver`]
//! that receives results incrementally, and the stub is constructed with that
//! observer rather than receiving it as a call argument.
//!
//! ## Reference stub
//!
//! The [`grpc`] module ships a [`grpc::stub::DynamicStub`] backed by
//! `tonic::client::Grpc` and a `DynamicMessage` codec, usable as the registry
//! entry for any service a `prost_reflect::ServiceDescriptor` is available for.
//!
//! ## Re-exports
//!
//! This crate re-exports `prost`, `prost-reflect`, and `tonic` to ensure that
//! consumers use compatible versions of these underlying dependencies.
pub mod config;
pub mod grpc;
pub mod invoker;
pub mod observer;
pub mod options;
pub mod registry;
pub mod request;
pub mod stub;

// Re-exports
pub use prost;
pub use prost_reflect;
pub use tonic;

/// Type alias for the standard boxed error used in generic bounds and as the
/// failure type of [`stub::StubFactory::create`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
