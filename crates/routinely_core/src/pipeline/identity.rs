//! Identity collaborator contract.
//!
//! The pipeline never implements a sign-in flow itself; it only asks the
//! provider for the current identity and requests interactive sign-in when
//! there is none.

use crate::model::record::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedIn(Identity),
    SignedOut,
}

/// Interactive sign-in was rejected or errored. Retrying is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInError {
    /// Provider error code, e.g. `auth/popup-closed-by-user`.
    pub code: String,
    pub message: String,
    pub email: Option<String>,
}

impl SignInError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            email: None,
        }
    }
}

impl Display for SignInError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "sign-in failed ({}): {}", self.code, self.message)?;
        if let Some(email) = &self.email {
            write!(f, " [{email}]")?;
        }
        Ok(())
    }
}

impl Error for SignInError {}

pub trait IdentityProvider {
    fn current(&self) -> AuthState;
    fn sign_in(&self) -> Result<Identity, SignInError>;
}

impl<T: IdentityProvider + ?Sized> IdentityProvider for &T {
    fn current(&self) -> AuthState {
        (**self).current()
    }

    fn sign_in(&self) -> Result<Identity, SignInError> {
        (**self).sign_in()
    }
}

/// Provider with a fixed, already-known identity (or none at all).
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    identity: Option<Identity>,
}

impl StaticIdentity {
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn signed_out() -> Self {
        Self { identity: None }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current(&self) -> AuthState {
        match &self.identity {
            Some(identity) => AuthState::SignedIn(identity.clone()),
            None => AuthState::SignedOut,
        }
    }

    fn sign_in(&self) -> Result<Identity, SignInError> {
        self.identity.clone().ok_or_else(|| {
            SignInError::new("auth/unavailable", "no interactive sign-in is configured")
        })
    }
}
