//! Wire types for the relay HTTP API and the decoded values handed upward.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::blockchain::address_hex;
use crate::numeric::{hex_to_decimal, Amount};
use crate::relay::error::{RelayError, RelayResult};

pub const TIMESTAMP_PATH: &str = "/v1/timestamp";
pub const SKELETON_PATH: &str = "/v1/tx/skel";
pub const BROADCAST_PATH: &str = "/v1/tx";
pub const BALANCE_PATH: &str = "/v1/balance";
pub const PUSH_REGISTER_PATH: &str = "/v1/apn/register";
pub const REGISTER_PATH: &str = "/v1/register";
pub const DEREGISTER_PATH: &str = "/v1/deregister";

/// Inputs for a skeleton build.
///
/// `data`, `gas`, `gas_price` and `nonce` are forwarded only when set; the
/// server fills in whatever is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonParams {
    pub from: Address,
    pub to: Address,
    pub value: Amount,
    pub data: Option<String>,
    pub gas: Option<Amount>,
    pub gas_price: Option<Amount>,
    pub nonce: Option<Amount>,
}

impl SkeletonParams {
    /// A plain value transfer.
    pub fn transfer(from: Address, to: Address, value: Amount) -> Self {
        Self {
            from,
            to,
            value,
            data: None,
            gas: None,
            gas_price: None,
            nonce: None,
        }
    }
}

/// JSON body of `POST /v1/tx/skel`.
#[derive(Debug, Serialize)]
pub(crate) struct SkeletonRequest {
    from: String,
    to: String,
    value: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas: Option<Amount>,
    #[serde(rename = "gasPrice", skip_serializing_if = "Option::is_none")]
    gas_price: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<Amount>,
}

impl From<&SkeletonParams> for SkeletonRequest {
    fn from(params: &SkeletonParams) -> Self {
        Self {
            from: address_hex(&params.from),
            to: address_hex(&params.to),
            value: params.value,
            data: params.data.clone(),
            gas: params.gas,
            gas_price: params.gas_price,
            nonce: params.nonce,
        }
    }
}

/// Raw skeleton response; every field is optional until validated.
#[derive(Debug, Deserialize)]
pub(crate) struct SkeletonResponse {
    tx: Option<String>,
    gas: Option<String>,
    #[serde(rename = "gasPrice", alias = "gas_price")]
    gas_price: Option<String>,
    nonce: Option<String>,
}

/// A server-built, unsigned transaction plus its fee inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionSkeleton {
    pub from: Address,
    pub to: Address,
    pub value: Amount,
    pub gas: Amount,
    pub gas_price: Amount,
    pub nonce: Option<Amount>,
    pub data: Option<String>,
    pub unsigned_transaction_hex: String,
}

impl TransactionSkeleton {
    /// Validate a raw response against the request that produced it.
    pub(crate) fn from_response(params: &SkeletonParams, raw: SkeletonResponse) -> RelayResult<Self> {
        let missing = |field: &str| RelayError::MalformedResponse {
            path: SKELETON_PATH.to_string(),
            reason: format!("missing '{}'", field),
        };

        let tx = raw.tx.filter(|tx| !tx.is_empty()).ok_or_else(|| missing("tx"))?;
        let gas = raw.gas.ok_or_else(|| missing("gas"))?;
        let gas_price = raw.gas_price.ok_or_else(|| missing("gasPrice"))?;

        let nonce = match raw.nonce.as_deref() {
            Some(n) => Some(hex_to_decimal(n)?),
            None => params.nonce,
        };

        Ok(Self {
            from: params.from,
            to: params.to,
            value: params.value,
            gas: hex_to_decimal(gas.as_str())?,
            gas_price: hex_to_decimal(gas_price.as_str())?,
            nonce,
            data: params.data.clone(),
            unsigned_transaction_hex: tx,
        })
    }
}

/// JSON body of `POST /v1/tx`.
#[derive(Debug, Serialize)]
pub(crate) struct BroadcastRequest<'a> {
    pub tx: &'a str,
    pub signature: &'a str,
}

/// What the relay told us about an accepted broadcast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionReceiptRef {
    /// Transaction hash, when the relay reports one.
    pub tx_hash: Option<String>,
    /// Full response body.
    pub raw: serde_json::Value,
}

impl TransactionReceiptRef {
    pub(crate) fn from_json(raw: serde_json::Value) -> Self {
        let tx_hash = ["tx_hash", "hash", "txHash"]
            .iter()
            .find_map(|key| raw.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string);
        Self { tx_hash, raw }
    }
}

/// One structured error object from a relay error body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Any other fields, preserved as sent.
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{}: {}", code, message),
            (Some(code), None) => write!(f, "{}", code),
            (None, Some(message)) => write!(f, "{}", message),
            (None, None) => match &self.id {
                Some(id) => write!(f, "{}", id),
                None => write!(f, "unspecified error"),
            },
        }
    }
}

/// `{ "errors": [ ... ] }`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ServerError>,
}

impl ErrorBody {
    /// The first reported error, if the body has the structured shape.
    pub(crate) fn first_error(body: &[u8]) -> Option<ServerError> {
        serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.errors.into_iter().next())
    }

    /// Best human-readable message for a failed response.
    pub(crate) fn server_message(body: &[u8]) -> String {
        if let Some(first) = Self::first_error(body) {
            return first.to_string();
        }
        let text = String::from_utf8_lossy(body);
        let text = text.trim();
        if text.is_empty() {
            "empty response body".to_string()
        } else {
            text.chars().take(512).collect()
        }
    }
}

/// Raw balance response.
#[derive(Debug, Deserialize)]
pub(crate) struct BalanceResponse {
    confirmed_balance: Option<String>,
    unconfirmed_balance: Option<String>,
}

/// Address balance, advisory the moment it is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub confirmed: Amount,
    pub unconfirmed: Option<Amount>,
}

impl Balance {
    pub(crate) fn from_response(raw: BalanceResponse) -> RelayResult<Self> {
        Ok(Self {
            confirmed: hex_to_decimal(raw.confirmed_balance.as_deref())?,
            unconfirmed: raw
                .unconfirmed_balance
                .as_deref()
                .map(|s| hex_to_decimal(s))
                .transpose()?,
        })
    }
}

/// `GET /v1/timestamp`; anything but an integer is a sync failure.
#[derive(Debug, Deserialize)]
pub(crate) struct TimestampResponse {
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct PushRegistrationRequest<'a> {
    pub registration_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddressesRequest {
    pub addresses: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::parse_address;

    fn params() -> SkeletonParams {
        SkeletonParams::transfer(
            parse_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap(),
            parse_address("0x3535353535353535353535353535353535353535").unwrap(),
            Amount::from(1_000_000u64),
        )
    }

    #[test]
    fn test_skeleton_request_omits_unset_fields() {
        let body = serde_json::to_value(SkeletonRequest::from(&params())).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                "to": "0x3535353535353535353535353535353535353535",
                "value": "0xf4240",
            })
        );

        let mut with_gas = params();
        with_gas.gas_price = Some(Amount::from(20_000_000_000u64));
        let body = serde_json::to_value(SkeletonRequest::from(&with_gas)).unwrap();
        assert_eq!(body["gasPrice"], "0x4a817c800");
    }

    #[test]
    fn test_skeleton_from_response() {
        let raw: SkeletonResponse = serde_json::from_str(
            r#"{"tx": "0xe980", "gas": "0x5208", "gasPrice": "0x4a817c800", "nonce": "0x7"}"#,
        )
        .unwrap();
        let skeleton = TransactionSkeleton::from_response(&params(), raw).unwrap();
        assert_eq!(skeleton.gas, Amount::from(21_000u64));
        assert_eq!(skeleton.gas_price, Amount::from(20_000_000_000u64));
        assert_eq!(skeleton.nonce, Some(Amount::from(7u64)));
        assert_eq!(skeleton.value, Amount::from(1_000_000u64));
        assert_eq!(skeleton.unsigned_transaction_hex, "0xe980");
    }

    #[test]
    fn test_skeleton_missing_field_is_malformed() {
        let raw: SkeletonResponse = serde_json::from_str(r#"{"tx": "0xe980", "gas": "0x5208"}"#).unwrap();
        let err = TransactionSkeleton::from_response(&params(), raw).unwrap_err();
        assert!(matches!(err, RelayError::MalformedResponse { .. }));
        assert!(err.to_string().contains("gasPrice"));
    }

    #[test]
    fn test_first_error_only() {
        let body = br#"{"errors": [{"code": "insufficient_funds", "message": "not enough"}, {"code": "other"}]}"#;
        let first = ErrorBody::first_error(body).unwrap();
        assert_eq!(first.code.as_deref(), Some("insufficient_funds"));
        assert_eq!(first.to_string(), "insufficient_funds: not enough");
    }

    #[test]
    fn test_server_message_fallbacks() {
        assert_eq!(ErrorBody::server_message(b""), "empty response body");
        assert_eq!(ErrorBody::server_message(b"bad gateway"), "bad gateway");
        assert_eq!(ErrorBody::server_message(br#"{"errors": []}"#), r#"{"errors": []}"#);
    }

    #[test]
    fn test_server_error_keeps_extra_fields() {
        let err: ServerError =
            serde_json::from_str(r#"{"id": "bad_arguments", "field": "tx"}"#).unwrap();
        assert_eq!(err.to_string(), "bad_arguments");
        assert_eq!(err.details["field"], "tx");
    }

    #[test]
    fn test_balance_missing_is_zero() {
        let raw: BalanceResponse = serde_json::from_str("{}").unwrap();
        let balance = Balance::from_response(raw).unwrap();
        assert_eq!(balance.confirmed, Amount::ZERO);
        assert_eq!(balance.unconfirmed, None);

        let raw: BalanceResponse =
            serde_json::from_str(r#"{"confirmed_balance": "0x10", "unconfirmed_balance": "0x20"}"#).unwrap();
        let balance = Balance::from_response(raw).unwrap();
        assert_eq!(balance.confirmed, Amount::from(16u64));
        assert_eq!(balance.unconfirmed, Some(Amount::from(32u64)));
    }

    #[test]
    fn test_receipt_hash_extraction() {
        let receipt = TransactionReceiptRef::from_json(serde_json::json!({"tx_hash": "0xabc"}));
        assert_eq!(receipt.tx_hash.as_deref(), Some("0xabc"));

        let receipt = TransactionReceiptRef::from_json(serde_json::Value::Null);
        assert_eq!(receipt.tx_hash, None);
    }

    #[test]
    fn test_timestamp_must_be_integer() {
        assert!(serde_json::from_str::<TimestampResponse>(r#"{"timestamp": 1500000000}"#).is_ok());
        assert!(serde_json::from_str::<TimestampResponse>(r#"{"timestamp": "1500000000"}"#).is_err());
        assert!(serde_json::from_str::<TimestampResponse>(r#"{"timestamp": 1.5}"#).is_err());
        assert!(serde_json::from_str::<TimestampResponse>("{}").is_err());
    }
}
