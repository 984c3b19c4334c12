//! Login session as seen by the catalog client.
//!
//! The login flow itself lives on the website; the terminal client only reads
//! who is signed in and the token to send along.

use serde::{Deserialize, Serialize};

/// Current login session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Display name of the signed-in user
    pub user: Option<String>,
    /// Bearer token issued by the site's login endpoint
    pub token: Option<String>,
}

impl Session {
    /// Whether a user is logged in.
    ///
    /// # Details
    /// A session counts as logged in only when both the user name and the token
    /// are present and non-empty.
    pub fn is_logged_in(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.user) && present(&self.token)
    }

    /// Name of the logged-in user.
    pub fn current_user(&self) -> Option<&str> {
        if self.is_logged_in() {
            self.user.as_deref()
        } else {
            None
        }
    }

    /// Header line describing the session.
    pub fn describe(&self) -> String {
        match self.current_user() {
            Some(user) => format!("Signed in as {}", user),
            None => "Browsing as guest".to_string(),
        }
    }
}
