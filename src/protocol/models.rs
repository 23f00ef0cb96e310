//! FSPIOP body models
//!
//! Each model lists only the fields that discriminate one message body from
//! another. Nested party/transaction structures are kept opaque because the
//! router forwards them unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Amount with ISO-4217 currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: String,
    pub currency: String,
}

/// `POST /quotes`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesPostRequest {
    pub quote_id: String,
    pub transaction_id: String,
    pub amount_type: String,
    pub amount: Money,
    pub payee: Value,
    pub payer: Value,
    pub transaction_type: Value,
}

/// `PUT /quotes/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotesIdPutResponse {
    pub transfer_amount: Money,
    pub expiration: String,
    pub ilp_packet: String,
    pub condition: String,
}

/// `POST /transfers`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransfersPostRequest {
    pub transfer_id: String,
    pub payer_fsp: String,
    pub payee_fsp: String,
    pub amount: Money,
    pub ilp_packet: String,
    pub condition: String,
    pub expiration: String,
}

/// `PUT /transfers/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransfersIdPutResponse {
    pub transfer_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfilment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInformation {
    pub error_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// `PUT /{quotes|transfers}/{id}/error`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInformationObject {
    pub error_information: ErrorInformation,
}
