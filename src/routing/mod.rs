//! Routing: keys, the endpoint registry and the resolver

pub mod key;
pub mod registry;
pub mod resolver;

pub use key::{Currency, RoutingKey};
pub use registry::EndpointRegistry;
pub use resolver::{CorrelationSource, RoutingResolver, correlation_sources, currency_of};
