//! fspiop_router - FSPIOP endpoint routing and message dispatch
//!
//! Routes quote and transfer messages arriving at `/{participant}/...` to the
//! peer endpoint registered for `(participant, currency)`.
//!
//! # Modules
//!
//! - [`protocol`] - Message models, kinds and the classifier
//! - [`routing`] - Routing keys, endpoint registry, routing resolver
//! - [`store`] - Correlation store capability and in-memory implementation
//! - [`endpoint`] - Peer endpoints and the HTTP forwarder
//! - [`dispatcher`] - classify → resolve → look up → forward
//! - [`gateway`] - Axum transport
//! - [`config`] / [`logging`] / [`bootstrap`] - Process setup

pub mod error;
pub mod protocol;

pub mod endpoint;
pub mod routing;
pub mod store;

pub mod dispatcher;

pub mod bootstrap;
pub mod config;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use dispatcher::{
    Accepted, DispatchOutcome, DispatchStatsSnapshot, Dispatcher, ForwardReport, InboundRequest,
};
pub use endpoint::{
    FnHandler, HttpForwarder, IncomingRequestHandler, PeerEndpoint, PeerResponse, handler_fn,
};
pub use error::{DispatchError, DispatchStage, EndpointError};
pub use protocol::{MessageKind, ObjectType, ProtocolMessage, classify};
pub use routing::{Currency, EndpointRegistry, RoutingKey, RoutingResolver};
pub use store::{
    InMemoryObjectStore, MessageRecorder, ObjectStore, StoreError, StoredObjectRef,
};
