//! Interpretation of the messaging API's connect response.
//!
//! The upstream API isn't consistent about where it reports the connection
//! state or the pairing code, so the response is read as loose JSON and
//! probed in a fixed order.

use crate::error::ConnectError;
use serde_json::{Map, Value};

/// Keys a pairing code may be reported under, in lookup order.
const PAIR_CODE_KEYS: [&str; 3] = ["paircode", "pair_code", "pairCode"];

/// Connection status extracted from a connect response.
///
/// `pair_code` is always `None` when `connected` is true.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectResult {
    /// The instance already has an active session
    pub connected: bool,
    /// Code to link a device, if the API issued one
    pub pair_code: Option<String>,
}

/// What the operator is shown after a successful connect call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Nothing to do, the instance is already paired.
    AlreadyConnected,
    /// The instance is waiting for this code to be entered on the phone.
    PairCode(String),
}

impl ConnectResult {
    /// Normalize an arbitrary connect response.
    ///
    /// The instance counts as connected when any of these holds:
    /// a truthy top-level `connected`, a truthy `status.connected`, or
    /// `instance.status` equal to `"connected"` ignoring case. Otherwise the
    /// pairing code is searched in `instance` first, then at the top level.
    pub fn from_response(payload: &Value) -> Self {
        let empty = Map::new();
        let payload = payload.as_object().unwrap_or(&empty);
        let instance = payload.get("instance").and_then(Value::as_object);

        if is_connected(payload, instance) {
            return Self {
                connected: true,
                pair_code: None,
            };
        }

        let pair_code = instance
            .and_then(find_pair_code)
            .or_else(|| find_pair_code(payload));

        Self {
            connected: false,
            pair_code,
        }
    }
}

impl TryFrom<ConnectResult> for ConnectOutcome {
    type Error = ConnectError;

    fn try_from(result: ConnectResult) -> Result<Self, Self::Error> {
        match result {
            ConnectResult {
                connected: true, ..
            } => Ok(Self::AlreadyConnected),
            ConnectResult {
                pair_code: Some(code),
                ..
            } => Ok(Self::PairCode(code)),
            ConnectResult {
                pair_code: None, ..
            } => Err(ConnectError::NoPairCode),
        }
    }
}

fn is_connected(payload: &Map<String, Value>, instance: Option<&Map<String, Value>>) -> bool {
    if payload.get("connected").map_or(false, is_truthy) {
        return true;
    }

    let status_connected = payload
        .get("status")
        .and_then(Value::as_object)
        .and_then(|status| status.get("connected"))
        .map_or(false, is_truthy);
    if status_connected {
        return true;
    }

    instance
        .and_then(|instance| instance.get("status"))
        .and_then(Value::as_str)
        .map_or(false, |status| status.eq_ignore_ascii_case("connected"))
}

fn find_pair_code(object: &Map<String, Value>) -> Option<String> {
    PAIR_CODE_KEYS.iter().find_map(|key| {
        object
            .get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
    })
}

/// Loose truthiness: `false`, `null`, zero, and empty strings, arrays and
/// objects are falsy. Everything else is truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
