//! Activation events delivered when the user selects a search result.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Activity type the system uses for a selected searchable item.
pub const SEARCHABLE_ITEM_ACTION_TYPE: &str = "com.apple.corespotlightitem";

/// User-info key carrying the selected record's unique identifier.
pub const ACTIVITY_IDENTIFIER_KEY: &str = "kCSSearchableItemActivityIdentifier";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivity {
    pub activity_type: String,
    pub user_info: HashMap<String, String>,
}

impl UserActivity {
    pub fn new(activity_type: impl Into<String>) -> Self {
        Self { activity_type: activity_type.into(), user_info: HashMap::new() }
    }

    /// The activity the system delivers when the record `identifier` is tapped.
    pub fn searchable_item(identifier: impl Into<String>) -> Self {
        let mut activity = Self::new(SEARCHABLE_ITEM_ACTION_TYPE);
        activity.user_info.insert(ACTIVITY_IDENTIFIER_KEY.to_string(), identifier.into());
        activity
    }

    /// The selected record's identifier, if this is a searchable-item activity.
    pub fn searchable_item_identifier(&self) -> Option<&str> {
        if self.activity_type != SEARCHABLE_ITEM_ACTION_TYPE {
            return None;
        }
        self.user_info.get(ACTIVITY_IDENTIFIER_KEY).map(String::as_str)
    }
}
