use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ForwardError, ForwardResult};
use crate::keys::validate_identifier;

/// Forwarding instructions carried in the memo of an inbound transfer:
///
/// ```json
/// {"forward": {"receiver": "osmo1...", "port": "transfer", "channel": "channel-1"}}
/// ```
///
/// Other top level memo keys are left alone.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ForwardMetadata {
    /// Receiver on the next chain
    pub receiver: String,
    pub port: String,
    pub channel: String,
    /// Relative timeout in nanoseconds, overrides the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Overrides the configured number of retries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// Memo for the outbound transfer, e.g. instructions for the next hop.
    /// Objects are sent JSON encoded, strings as they are.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Value>,
}

impl ForwardMetadata {
    pub fn validate(&self) -> ForwardResult<()> {
        if self.receiver.trim().is_empty() {
            return Err(ForwardError::invalid_metadata("receiver must not be empty"));
        }
        validate_identifier("port", &self.port)?;
        validate_identifier("channel", &self.channel)
    }

    /// The memo to put on the outbound transfer
    pub fn next_memo(&self) -> Option<String> {
        match &self.next {
            None | Some(Value::Null) => None,
            Some(Value::String(memo)) => Some(memo.clone()),
            Some(value) => Some(value.to_string()),
        }
    }
}

/// Extracts forwarding instructions from a transfer memo.
///
/// Returns `Ok(None)` for memos that are empty, not a JSON object or that
/// have no `forward` key: those transfers are not for us. A `forward` key
/// that does not hold valid instructions is an error.
pub fn parse_forward_metadata(memo: Option<&str>) -> ForwardResult<Option<ForwardMetadata>> {
    let Some(memo) = memo else {
        return Ok(None);
    };
    let Ok(Value::Object(mut fields)) = serde_json::from_str::<Value>(memo) else {
        return Ok(None);
    };
    let Some(forward) = fields.remove("forward") else {
        return Ok(None);
    };
    let metadata: ForwardMetadata = serde_json::from_value(forward)
        .map_err(|e| ForwardError::invalid_metadata(e.to_string()))?;
    metadata.validate()?;
    Ok(Some(metadata))
}
