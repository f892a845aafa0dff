//! Authentication session collaborator types
//!
//! The cart store never manages or validates credentials; it only reads the
//! bearer token off the session supplied by the auth layer when attaching
//! outbound stock-check requests.

use serde::{Deserialize, Serialize};

/// Authenticated user profile as delivered by the auth collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Account email.
    #[serde(default)]
    pub email:        Option<String>,
    /// Backend roles, e.g. `customer`, `shop_manager`.
    #[serde(default)]
    pub roles:        Vec<String>,
}

/// Read-only view of the authentication state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSession {
    /// Whether a user is signed in.
    pub is_authenticated: bool,
    /// Bearer credential for backend requests.
    pub token:            Option<String>,
    /// Signed-in user profile, when loaded.
    pub user:             Option<UserProfile>,
}

impl AuthSession {
    /// Session for a signed-out visitor.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Session for a signed-in user.
    #[must_use]
    pub fn authenticated(token: impl Into<String>, user: Option<UserProfile>) -> Self {
        Self { is_authenticated: true, token: Some(token.into()), user }
    }

    /// Token to attach to outbound requests, when signed in.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        if self.is_authenticated {
            self.token.as_deref()
        } else {
            None
        }
    }

    /// Whether the signed-in user manages the shop.
    #[must_use]
    pub fn is_shop_manager(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| user.roles.iter().any(|role| role == "shop_manager"))
    }
}
