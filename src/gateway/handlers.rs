//! Gateway handlers
//!
//! - [`fspiop`]: quote and transfer routes, all funnelled into the dispatcher
//! - [`health`]: liveness plus routing table and dispatch counters

pub mod fspiop;
pub mod health;

pub use fspiop::route_message;
pub use health::health_check;
