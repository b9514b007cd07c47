//! # Dynamic Stub
//!
//! A [`Stub`] driving `tonic::client::Grpc` with the [`DynamicCodec`].
//!
//! The stub is bound at construction to one channel, one set of call options
//! and, for streaming calls, the observer that will receive results. Method
//! names are resolved against the service descriptor at call time; only the
//! two shapes reachable through the bridge's argument conventions are
//! supported (unary and server-streaming).
use super::codec::DynamicCodec;
use crate::BoxError;
use crate::observer::ResponseObserver;
use crate::options::CallOptions;
use crate::stub::{Stub, StubContext, StubFactory};
use http_body::Body as HttpBody;
use prost_reflect::{DynamicMessage, MethodDescriptor, ServiceDescriptor};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tonic::{Status, Streaming, client::GrpcService};

/// A callable stub over one gRPC service, built from its descriptor.
pub struct DynamicStub<S> {
    service: ServiceDescriptor,
    grpc: tonic::client::Grpc<S>,
    options: CallOptions,
    timeout_millis: Option<u64>,
    observer: Option<Arc<dyn ResponseObserver>>,
}

#[async_trait::async_trait]
impl<S> Stub for DynamicStub<S>
where
    S: GrpcService<tonic::body::Body> + Send,
    S::Error: Into<BoxError>,
    S::Future: Send,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    async fn call(
        &mut self,
        method: &str,
        request: DynamicMessage,
    ) -> Result<Option<DynamicMessage>, Status> {
        let method = self
            .service
            .methods()
            .find(|m| m.name() == method)
            .ok_or_else(|| {
                Status::unimplemented(format!(
                    "Method '{}' not found in service '{}'",
                    method,
                    self.service.full_name(),
                ))
            })?;

        self.grpc.ready().await.map_err(|e| {
            let e: BoxError = e.into();
            Status::unavailable(format!("Client was not ready: {e}"))
        })?;

        let codec = DynamicCodec::new(method.input(), method.output());
        let path = http_path(&method);
        let req = self.build_request(request);

        match (method.is_client_streaming(), method.is_server_streaming()) {
            (false, false) => {
                let response = self.grpc.unary(req, path, codec).await?;
                Ok(Some(response.into_inner()))
            }
            (false, true) => {
                let observer = self.observer.clone().ok_or_else(|| {
                    Status::failed_precondition(format!(
                        "Method '{}' streams its results but the request carried no observer",
                        method.name(),
                    ))
                })?;

                let stream = self.grpc.server_streaming(req, path, codec).await?;
                tokio::spawn(forward_to_observer(stream.into_inner(), observer));
                Ok(None)
            }
            (true, _) => Err(Status::unimplemented(format!(
                "Method '{}' expects a request stream; the bridge carries a single payload",
                method.name(),
            ))),
        }
    }
}

impl<S> DynamicStub<S> {
    /// Wraps the payload and applies the deadline: the options' deadline when
    /// one was set, otherwise the caller's relative timeout.
    fn build_request(&self, payload: DynamicMessage) -> tonic::Request<DynamicMessage> {
        let mut req = tonic::Request::new(payload);
        if let Some(remaining) = self.options.time_remaining() {
            req.set_timeout(remaining);
        } else if let Some(millis) = self.timeout_millis {
            req.set_timeout(Duration::from_millis(millis));
        }
        req
    }
}

/// Drains a response stream into the observer. Terminal callbacks are made
/// exactly once; the task ends with them.
async fn forward_to_observer(
    mut stream: Streaming<DynamicMessage>,
    observer: Arc<dyn ResponseObserver>,
) {
    loop {
        match stream.message().await {
            Ok(Some(message)) => observer.on_next(message),
            Ok(None) => {
                observer.on_completed();
                break;
            }
            Err(status) => {
                observer.on_error(status);
                break;
            }
        }
    }
}

fn http_path(method: &MethodDescriptor) -> http::uri::PathAndQuery {
    let path = format!("/{}/{}", method.parent_service().full_name(), method.name());
    http::uri::PathAndQuery::from_str(&path).expect("valid gRPC path")
}

/// Builds [`DynamicStub`]s for one service.
///
/// Register an instance under the service's generation scope to make the
/// service callable through the bridge without hand-written client code.
pub struct DynamicStubFactory {
    service: ServiceDescriptor,
}

impl DynamicStubFactory {
    pub fn new(service: ServiceDescriptor) -> Self {
        Self { service }
    }
}

impl<S> StubFactory<S> for DynamicStubFactory
where
    S: GrpcService<tonic::body::Body> + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
    S::ResponseBody: HttpBody<Data = tonic::codegen::Bytes> + Send + 'static,
    <S::ResponseBody as HttpBody>::Error: Into<BoxError> + Send,
{
    fn create(&self, ctx: StubContext<S>) -> Result<Box<dyn Stub>, BoxError> {
        Ok(Box::new(DynamicStub {
            service: self.service.clone(),
            grpc: tonic::client::Grpc::new(ctx.channel),
            options: ctx.options,
            timeout_millis: ctx.timeout_millis,
            observer: ctx.observer,
        }))
    }
}
