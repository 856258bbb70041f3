//! Session persistence on top of client-side storage
//!
//! A session is the CMS-issued token plus a denormalised profile snapshot.
//! Both are written under fixed keys in one storage scope; reads look at
//! every scope so a session saved in either is found.

use common::storage::{SessionStorage, StorageScope};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Storage key of the session token
pub const TOKEN_KEY: &str = "strapi_jwt";
/// Storage key of the serialised profile
pub const PROFILE_KEY: &str = "user";
/// Role shown when the CMS does not provide one
pub const DEFAULT_ROLE: &str = "Usuário";

/// Online status shown next to the user's name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    #[default]
    Offline,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Online => "online",
            Presence::Offline => "offline",
        }
    }
}

/// Profile snapshot stored next to the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "name", default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "avatar", default)]
    pub avatar_url: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(rename = "status", default)]
    pub presence: Presence,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

impl Profile {
    /// Profile rendered when no valid session data is stored
    pub fn anonymous() -> Self {
        Self {
            display_name: "Visitante".to_string(),
            email: String::new(),
            avatar_url: String::new(),
            role: default_role(),
            presence: Presence::Offline,
        }
    }

    /// Up to two uppercase initials for the avatar fallback
    pub fn initials(&self) -> String {
        let source = if self.display_name.trim().is_empty() {
            self.email.as_str()
        } else {
            self.display_name.as_str()
        };

        source
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }

    pub fn has_avatar(&self) -> bool {
        !self.avatar_url.is_empty()
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// Authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub profile: Profile,
}

/// Session manager over an injected storage capability
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    storage: S,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Create a new session store
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Persist a session in `scope`, dropping any copy held in other scopes
    pub fn save(&self, session: &Session, scope: StorageScope) -> Result<(), serde_json::Error> {
        let profile = serde_json::to_string(&session.profile)?;

        for other in StorageScope::ALL.into_iter().filter(|s| *s != scope) {
            self.storage.remove(other, TOKEN_KEY);
            self.storage.remove(other, PROFILE_KEY);
        }

        self.storage.set(scope, TOKEN_KEY, &session.token);
        self.storage.set(scope, PROFILE_KEY, &profile);

        info!("Session stored in {} scope", scope.as_str());
        Ok(())
    }

    /// Token of the current session, if any scope holds a non-empty one
    pub fn token(&self) -> Option<String> {
        StorageScope::ALL
            .into_iter()
            .filter_map(|scope| self.storage.get(scope, TOKEN_KEY))
            .find(|token| !token.is_empty())
    }

    /// Stored profile, or the anonymous profile when absent or malformed
    pub fn profile(&self) -> Profile {
        for scope in StorageScope::ALL {
            let Some(raw) = self.storage.get(scope, PROFILE_KEY) else {
                continue;
            };

            match serde_json::from_str::<Profile>(&raw) {
                Ok(profile) => return profile,
                Err(e) => warn!("Ignoring malformed profile in {} scope: {}", scope.as_str(), e),
            }
        }

        Profile::anonymous()
    }

    /// Current session, when a token is stored
    pub fn load(&self) -> Option<Session> {
        let token = self.token()?;
        Some(Session {
            token,
            profile: self.profile(),
        })
    }

    /// Remove token and profile from every scope
    pub fn clear(&self) {
        self.storage.remove_everywhere(TOKEN_KEY);
        self.storage.remove_everywhere(PROFILE_KEY);
        info!("Session cleared");
    }
}
