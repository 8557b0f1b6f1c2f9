//! Session settings
//!
//! Read from the page URL so a link can drop a player straight into a room
//! and lane: `?room=dojo&slot=2&name=Tomoe`.

use serde::{Deserialize, Serialize};

use crate::consts::LANES;

/// Room used when the URL names none
pub const DEFAULT_ROOM: &str = "default";

/// Settings for this tab's session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Broadcast room shared with other tabs
    pub room: String,
    /// Preselected lane (0-based)
    pub lane: Option<usize>,
    /// Prefilled display name
    pub name: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            room: DEFAULT_ROOM.to_owned(),
            lane: None,
            name: None,
        }
    }
}

impl Settings {
    /// Parse a query string (with or without the leading `?`)
    ///
    /// Unknown keys and malformed values are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut settings = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            match key.as_ref() {
                "room" if !value.is_empty() => settings.room = value.to_owned(),
                "slot" => {
                    settings.lane = value
                        .parse::<usize>()
                        .ok()
                        .filter(|slot| (1..=LANES).contains(slot))
                        .map(|slot| slot - 1);
                }
                "name" => settings.name = (!value.is_empty()).then(|| value.to_owned()),
                _ => {}
            }
        }
        settings
    }
}
