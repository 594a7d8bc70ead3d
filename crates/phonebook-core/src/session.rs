//! Session snapshot.

use crate::auth::BearerAuth;

/// Authentication state of the client.
///
/// The token is private so that `is_authenticated()` can only ever mean
/// "a token is held".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    /// A login request is in flight.
    pub loading: bool,
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Stores a (new) token; also used when a refresh rotates it.
    pub fn authenticate(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear(&mut self) {
        self.token = None;
    }

    /// The credential to attach to an outgoing request, if any.
    pub fn bearer(&self) -> Option<BearerAuth> {
        self.token.as_deref().map(BearerAuth::new)
    }
}
