use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::KeyValueStore;
use crate::normalize::id_from_value;

/// Store key the login flow writes the signed-in user to.
pub const PROFILE_KEY: &str = "sc_user";

/// The signed-in child, as saved by the login and profile screens.
///
/// Read-only here: this crate never writes `sc_user`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    // Number or numeric string depending on which screen saved it last
    #[serde(default)]
    child_id: Option<Value>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub guardian_name: Option<String>,
}

impl Profile {
    /// Read the current profile from the store. Missing or unreadable
    /// profiles are treated as "nobody signed in".
    pub async fn load<S: KeyValueStore + ?Sized>(store: &S) -> Option<Self> {
        let raw = match store.get(PROFILE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(error = %e, "Failed to read profile");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                debug!(error = %e, "Failed to parse profile");
                None
            }
        }
    }

    pub fn child_id(&self) -> Option<i64> {
        self.child_id.as_ref().and_then(id_from_value)
    }

    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}
