//! # Reference gRPC Stub
//!
//! A [`crate::stub::Stub`] implementation backed by `tonic::client::Grpc` and
//! a `prost_reflect::DynamicMessage` codec.
//!
//! Generated clients normally provide their own stubs; this module covers the
//! common case where a `prost_reflect::ServiceDescriptor` for the target
//! service is available and no hand-written client exists. Registering a
//! [`stub::DynamicStubFactory`] under the service's generation scope makes
//! every method of that service callable through the bridge.
pub mod codec;
pub mod stub;
