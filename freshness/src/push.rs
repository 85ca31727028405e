//! Messages on the server-push channel.
//!
//! Wire format, one JSON object per message:
//!
//! ```jsonc
//! { "type": "version", "version": "1.4.2" }
//! { "type": "data_next_updated", "reason": "publication", "timestamp": "..." }
//! ```
//!
//! `type` is one of `version`, `data_current_updated`, `data_next_updated`
//! or `cache_rotated`; the server's older names `today_updated` and
//! `tomorrow_updated` are accepted as aliases. Other types are ignored so the
//! server can add message kinds without breaking older sessions. Extra
//! fields are ignored.

use serde::Deserialize;
use thiserror::Error;

use crate::partition::Partition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    /// The version the server is running.
    Version { version: String },
    /// The server has new data for one partition.
    PartitionUpdated {
        partition: Partition,
        reason: Option<String>,
    },
    /// The server rotated its cache (midnight); both partitions changed.
    CacheRotated { reason: Option<String> },
}

#[derive(Error, Debug)]
pub enum PushParseError {
    #[error("invalid push payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`{kind}` message without `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}

#[derive(Debug, Deserialize)]
struct RawPushMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Parse one push payload.
///
/// `Ok(None)` means a well-formed message of a type this session does not
/// act on.
pub fn parse_push_message(raw: &str) -> Result<Option<PushMessage>, PushParseError> {
    let msg: RawPushMessage = serde_json::from_str(raw)?;

    let parsed = match msg.kind.as_str() {
        "version" => {
            let version = msg
                .version
                .filter(|v| !v.is_empty())
                .ok_or(PushParseError::MissingField {
                    kind: "version",
                    field: "version",
                })?;
            PushMessage::Version { version }
        }
        "data_current_updated" | "today_updated" => PushMessage::PartitionUpdated {
            partition: Partition::Current,
            reason: msg.reason,
        },
        "data_next_updated" | "tomorrow_updated" => PushMessage::PartitionUpdated {
            partition: Partition::Next,
            reason: msg.reason,
        },
        "cache_rotated" => PushMessage::CacheRotated { reason: msg.reason },
        _ => return Ok(None),
    };

    Ok(Some(parsed))
}
