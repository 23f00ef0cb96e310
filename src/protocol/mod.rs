//! FSPIOP protocol layer
//!
//! - [`models`]: body models used as discriminators
//! - [`message`]: [`ProtocolMessage`], [`MessageKind`], [`ObjectType`]
//! - [`classify`]: path/method/body classification

pub mod classify;
pub mod message;
pub mod models;

pub use classify::{Classified, classify};
pub use message::{MessageKind, ObjectType, ProtocolMessage};
pub use models::{
    ErrorInformation, ErrorInformationObject, Money, QuotesIdPutResponse, QuotesPostRequest,
    TransfersIdPutResponse, TransfersPostRequest,
};
