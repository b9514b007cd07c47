//! # Response Observer
//!
//! The callback handle through which streaming calls deliver their results.
//!
//! A streaming request carries an observer as its second positional argument.
//! The descriptor retains it, and stub construction hands it to the protocol
//! layer — observers are a property of the stub, never an explicit argument of
//! the call the orchestrator performs.
use prost_reflect::DynamicMessage;
use tonic::Status;

/// Receiver for incrementally delivered call results.
///
/// Implementations must tolerate delivery from whatever task the protocol
/// layer drives the response stream on. After `on_error` or `on_completed`,
/// no further callbacks are made.
pub trait ResponseObserver: Send + Sync {
    /// Called once per response message, in arrival order.
    fn on_next(&self, message: DynamicMessage);

    /// Called when the stream terminates with an error status. Terminal.
    fn on_error(&self, status: Status);

    /// Called when the stream completes normally. Terminal.
    fn on_completed(&self);
}
