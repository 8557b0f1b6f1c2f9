//! Cross-tab slot claims
//!
//! Tabs on the same device share a broadcast channel per room. A tab that
//! starts a round announces its lane so other tabs stop driving that lane
//! with the computer. Delivery is best-effort and unordered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Channel name prefix; the room name is appended
pub const CHANNEL_PREFIX: &str = "lane-dash-room-";

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("failed to encode channel message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode channel message: {0}")]
    Decode(#[source] serde_json::Error),
}

/// A decoded request to hand `lane` to a human
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotClaim {
    pub lane: usize,
    pub name: Option<String>,
}

/// Message as it travels over the channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChannelMessage {
    Claim {
        /// 1-based lane number
        slot: u32,
        #[serde(default)]
        name: Option<String>,
        #[serde(rename = "_from")]
        from: String,
        /// Sender clock, milliseconds
        #[serde(rename = "_t", default)]
        sent_at: f64,
    },
    /// Anything this build does not understand
    #[serde(other)]
    Unknown,
}

impl ChannelMessage {
    pub fn claim(lane: usize, name: &str, from: &str, sent_at: f64) -> Self {
        ChannelMessage::Claim {
            slot: lane as u32 + 1,
            name: Some(name.to_owned()),
            from: from.to_owned(),
            sent_at,
        }
    }

    pub fn encode(&self) -> Result<String, ClaimError> {
        serde_json::to_string(self).map_err(ClaimError::Encode)
    }

    pub fn decode(json: &str) -> Result<Self, ClaimError> {
        serde_json::from_str(json).map_err(ClaimError::Decode)
    }

    /// The claim carried by this message, unless it came from `own_id`
    pub fn into_claim(self, own_id: &str) -> Option<SlotClaim> {
        match self {
            ChannelMessage::Claim {
                slot, name, from, ..
            } if from != own_id => {
                let lane = (slot as usize).checked_sub(1)?;
                Some(SlotClaim { lane, name })
            }
            _ => None,
        }
    }
}

/// Channel name for a room
pub fn channel_name(room: &str) -> String {
    format!("{CHANNEL_PREFIX}{room}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_wire_format() {
        let json = ChannelMessage::claim(2, "Tomoe", "abc123", 1700.0).encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "claim");
        assert_eq!(value["slot"], 3);
        assert_eq!(value["name"], "Tomoe");
        assert_eq!(value["_from"], "abc123");
    }

    #[test]
    fn test_decode_foreign_claim() {
        let msg = ChannelMessage::decode(r#"{"type":"claim","slot":1,"name":"Bob","_from":"x","_t":5}"#)
            .unwrap();
        assert_eq!(
            msg.into_claim("me"),
            Some(SlotClaim {
                lane: 0,
                name: Some("Bob".into()),
            })
        );
    }

    #[test]
    fn test_own_and_bogus_messages_dropped() {
        let own = ChannelMessage::claim(0, "Bob", "me", 0.0);
        assert_eq!(own.into_claim("me"), None);

        let zero = ChannelMessage::decode(r#"{"type":"claim","slot":0,"_from":"x"}"#).unwrap();
        assert_eq!(zero.into_claim("me"), None);

        let other = ChannelMessage::decode(r#"{"type":"chat","text":"hi"}"#).unwrap();
        assert_eq!(other, ChannelMessage::Unknown);
        assert_eq!(other.into_claim("me"), None);

        assert!(matches!(
            ChannelMessage::decode("not json"),
            Err(ClaimError::Decode(_))
        ));
    }

    #[test]
    fn test_out_of_range_lane_survives_decoding() {
        // The simulation decides whether the lane exists
        let msg = ChannelMessage::decode(r#"{"type":"claim","slot":9,"_from":"x"}"#).unwrap();
        assert_eq!(msg.into_claim("me"), Some(SlotClaim { lane: 8, name: None }));
    }

    #[test]
    fn test_channel_name() {
        assert_eq!(channel_name("default"), "lane-dash-room-default");
    }
}
