use prost_reflect::{DescriptorPool, DynamicMessage, Value};
use std::sync::{Arc, Mutex};
use tonic::Status;
use tricall_core::BoxError;
use tricall_core::config::ConsumerConfig;
use tricall_core::invoker::{InvokeError, Invoker};
use tricall_core::observer::ResponseObserver;
use tricall_core::registry::{StubRegistry, StubResolveError};
use tricall_core::request::{CallArg, DescriptorError, GenericRequest};
use tricall_core::stub::{Stub, StubContext, StubFactory};

fn pool() -> DescriptorPool {
    DescriptorPool::decode(echo_service::FILE_DESCRIPTOR_SET).unwrap()
}

fn message(pool: &DescriptorPool, name: &str, text: &str) -> DynamicMessage {
    let desc = pool.get_message_by_name(name).unwrap();
    let mut msg = DynamicMessage::new(desc);
    msg.set_field_by_name("message", Value::String(text.to_string()));
    msg
}

fn unary_request(pool: &DescriptorPool, text: &str) -> GenericRequest {
    GenericRequest {
        interface_name: "echo.EchoService$EchoStub".to_string(),
        method: "UnaryEcho".to_string(),
        arg_signatures: vec!["echo.EchoRequest".to_string()],
        args: vec![CallArg::Message(message(pool, "echo.EchoRequest", text))],
        timeout_secs: None,
    }
}

struct NullObserver;

impl ResponseObserver for NullObserver {
    fn on_next(&self, _message: DynamicMessage) {}
    fn on_error(&self, _status: Status) {}
    fn on_completed(&self) {}
}

/// What a [`RecordingFactory`] saw when it was asked to build a stub.
#[derive(Clone)]
struct CreatedWith {
    observer: Option<Arc<dyn ResponseObserver>>,
    timeout_millis: Option<u64>,
    has_deadline: bool,
}

/// A factory producing stubs that answer every call with a canned response,
/// recording construction contexts and performed calls along the way.
struct RecordingFactory {
    response: Option<DynamicMessage>,
    created: Arc<Mutex<Vec<CreatedWith>>>,
    calls: Arc<Mutex<Vec<(String, DynamicMessage)>>>,
}

impl RecordingFactory {
    fn new(response: Option<DynamicMessage>) -> Self {
        Self {
            response,
            created: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

struct RecordingStub {
    response: Option<DynamicMessage>,
    calls: Arc<Mutex<Vec<(String, DynamicMessage)>>>,
}

#[async_trait::async_trait]
impl Stub for RecordingStub {
    async fn call(
        &mut self,
        method: &str,
        request: DynamicMessage,
    ) -> Result<Option<DynamicMessage>, Status> {
        self.calls.lock().unwrap().push((method.to_string(), request));
        Ok(self.response.clone())
    }
}

impl StubFactory<()> for RecordingFactory {
    fn create(&self, ctx: StubContext<()>) -> Result<Box<dyn Stub>, BoxError> {
        self.created.lock().unwrap().push(CreatedWith {
            observer: ctx.observer,
            timeout_millis: ctx.timeout_millis,
            has_deadline: ctx.options.deadline().is_some(),
        });
        Ok(Box::new(RecordingStub {
            response: self.response.clone(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

#[tokio::test]
async fn unary_invoke_wraps_stub_return_value() {
    let pool = pool();
    let response = message(&pool, "echo.EchoResponse", "result");
    let factory = Arc::new(RecordingFactory::new(Some(response.clone())));

    let mut registry = StubRegistry::new();
    registry.register("echo.EchoService", Arc::clone(&factory) as Arc<dyn StubFactory<()>>);

    let request = unary_request(&pool, "input");
    let invoker = Invoker::new(&request, (), Arc::new(registry), &pool).unwrap();

    let config = ConsumerConfig::new("echo.EchoService$EchoStub");
    let result = invoker.invoke(&config, None).await.unwrap();

    assert_eq!(result.app_response, Some(response));

    let calls = factory.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "UnaryEcho");
    assert_eq!(calls[0].1, message(&pool, "echo.EchoRequest", "input"));
}

#[tokio::test]
async fn type_mismatch_fails_before_any_resolution() {
    let pool = pool();
    let factory = Arc::new(RecordingFactory::new(None));

    let mut registry = StubRegistry::new();
    registry.register("echo.EchoService", Arc::clone(&factory) as Arc<dyn StubFactory<()>>);

    // Declared type and payload type disagree.
    let mut request = unary_request(&pool, "input");
    request.arg_signatures = vec!["echo.EchoResponse".to_string()];

    match Invoker::new(&request, (), Arc::new(registry), &pool) {
        Err(DescriptorError::TypeMismatch { expected, actual }) => {
            assert_eq!(expected, "echo.EchoResponse");
            assert_eq!(actual, "echo.EchoRequest");
        }
        Err(other) => panic!("Expected TypeMismatch, got {other:?}"),
        Ok(_) => panic!("Expected construction to fail"),
    }

    assert!(factory.created.lock().unwrap().is_empty());
    assert!(factory.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_factory_fails_without_calling_any_stub() {
    let pool = pool();
    let factory = Arc::new(RecordingFactory::new(None));

    // The factory is registered under an unrelated scope.
    let mut registry = StubRegistry::new();
    registry.register("other.Service", Arc::clone(&factory) as Arc<dyn StubFactory<()>>);

    let request = unary_request(&pool, "input");
    let invoker = Invoker::new(&request, (), Arc::new(registry), &pool).unwrap();

    let config = ConsumerConfig::new("echo.EchoService$EchoStub");
    match invoker.invoke(&config, None).await {
        Err(InvokeError::Stub(StubResolveError::FactoryNotFound(scope))) => {
            assert_eq!(scope, "echo.EchoService")
        }
        Err(other) => panic!("Expected FactoryNotFound, got {other:?}"),
        Ok(_) => panic!("Expected invocation to fail"),
    }

    assert!(factory.created.lock().unwrap().is_empty());
    assert!(factory.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn streaming_invoke_hands_observer_to_stub_construction() {
    let pool = pool();
    let factory = Arc::new(RecordingFactory::new(None));

    let mut registry = StubRegistry::new();
    registry.register("echo.EchoService", Arc::clone(&factory) as Arc<dyn StubFactory<()>>);

    let observer: Arc<dyn ResponseObserver> = Arc::new(NullObserver);
    let mut request = unary_request(&pool, "input");
    request.method = "ServerStreamingEcho".to_string();
    request.args.push(CallArg::Observer(Arc::clone(&observer)));

    let invoker = Invoker::new(&request, (), Arc::new(registry), &pool).unwrap();
    assert!(invoker.descriptor().is_streaming());

    let config = ConsumerConfig::new("echo.EchoService$EchoStub");
    let result = invoker.invoke(&config, None).await.unwrap();

    // Streaming calls return no payload; results go through the observer.
    assert!(result.app_response.is_none());

    let created = factory.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    let handed = created[0].observer.as_ref().unwrap();
    assert!(Arc::ptr_eq(handed, &observer));

    // The observer never appears among the call arguments.
    let calls = factory.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "ServerStreamingEcho");
}

#[tokio::test]
async fn invoke_timeout_overrides_request_timeout() {
    let pool = pool();
    let factory = Arc::new(RecordingFactory::new(None));

    let mut registry = StubRegistry::new();
    registry.register("echo.EchoService", Arc::clone(&factory) as Arc<dyn StubFactory<()>>);

    let mut request = unary_request(&pool, "input");
    request.timeout_secs = Some(30);

    let invoker = Invoker::new(&request, (), Arc::new(registry), &pool).unwrap();
    let config = ConsumerConfig::new("echo.EchoService$EchoStub");
    invoker.invoke(&config, Some(2)).await.unwrap();

    let created = factory.created.lock().unwrap();
    assert_eq!(created[0].timeout_millis, Some(2_000));
    assert!(created[0].has_deadline);
}

#[tokio::test]
async fn absent_timeout_falls_back_to_request_timeout() {
    let pool = pool();
    let factory = Arc::new(RecordingFactory::new(None));

    let mut registry = StubRegistry::new();
    registry.register("echo.EchoService", Arc::clone(&factory) as Arc<dyn StubFactory<()>>);

    let mut request = unary_request(&pool, "input");
    request.timeout_secs = Some(7);

    let invoker = Invoker::new(&request, (), Arc::new(registry), &pool).unwrap();
    let config = ConsumerConfig::new("echo.EchoService$EchoStub");
    invoker.invoke(&config, None).await.unwrap();

    let created = factory.created.lock().unwrap();
    assert_eq!(created[0].timeout_millis, Some(7_000));
    assert!(created[0].has_deadline);
}

#[tokio::test]
async fn stub_status_propagates_unmodified() {
    struct FailingStub;

    #[async_trait::async_trait]
    impl Stub for FailingStub {
        async fn call(
            &mut self,
            _method: &str,
            _request: DynamicMessage,
        ) -> Result<Option<DynamicMessage>, Status> {
            Err(Status::deadline_exceeded("too slow"))
        }
    }

    struct FailingStubFactory;

    impl StubFactory<()> for FailingStubFactory {
        fn create(&self, _ctx: StubContext<()>) -> Result<Box<dyn Stub>, BoxError> {
            Ok(Box::new(FailingStub))
        }
    }

    let pool = pool();
    let mut registry = StubRegistry::new();
    registry.register("echo.EchoService", Arc::new(FailingStubFactory) as Arc<dyn StubFactory<()>>);

    let request = unary_request(&pool, "input");
    let invoker = Invoker::new(&request, (), Arc::new(registry), &pool).unwrap();

    let config = ConsumerConfig::new("echo.EchoService$EchoStub");
    match invoker.invoke(&config, Some(1)).await {
        Err(InvokeError::Call(status)) => {
            assert_eq!(status.code(), tonic::Code::DeadlineExceeded);
            assert_eq!(status.message(), "too slow");
        }
        Err(other) => panic!("Expected Call error, got {other:?}"),
        Ok(_) => panic!("Expected invocation to fail"),
    }
}
