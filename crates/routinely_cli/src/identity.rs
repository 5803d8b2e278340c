//! Terminal identity provider: `--user` flag, or a user id typed on stdin.

use routinely_core::{AuthState, Identity, IdentityProvider, SignInError, UserId};
use std::cell::RefCell;
use std::io::{BufRead, BufReader, Stdin, Write};

pub struct PromptIdentity<R: BufRead> {
    user: Option<UserId>,
    input: RefCell<R>,
}

impl PromptIdentity<BufReader<Stdin>> {
    pub fn stdin(user: Option<UserId>) -> Self {
        Self::with_input(user, BufReader::new(std::io::stdin()))
    }
}

impl<R: BufRead> PromptIdentity<R> {
    pub fn with_input(user: Option<UserId>, input: R) -> Self {
        Self {
            user,
            input: RefCell::new(input),
        }
    }
}

impl<R: BufRead> IdentityProvider for PromptIdentity<R> {
    fn current(&self) -> AuthState {
        match &self.user {
            Some(user_id) => AuthState::SignedIn(Identity::new(user_id.clone())),
            None => AuthState::SignedOut,
        }
    }

    fn sign_in(&self) -> Result<Identity, SignInError> {
        eprint!("user id: ");
        let _ = std::io::stderr().flush();

        let mut line = String::new();
        let read = self
            .input
            .borrow_mut()
            .read_line(&mut line)
            .map_err(|err| SignInError::new("auth/io", err.to_string()))?;
        if read == 0 {
            return Err(SignInError::new("auth/cancelled", "no user id entered"));
        }

        UserId::parse(line.trim())
            .map(Identity::new)
            .map_err(|err| SignInError::new("auth/invalid-user-id", err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::PromptIdentity;
    use routinely_core::{AuthState, IdentityProvider, UserId};
    use std::io::Cursor;

    #[test]
    fn user_flag_signs_in_without_reading_input() {
        let identity = PromptIdentity::with_input(
            Some(UserId::parse("flagged").unwrap()),
            Cursor::new("typed\n"),
        );

        match identity.current() {
            AuthState::SignedIn(signed_in) => assert_eq!(signed_in.user_id.as_str(), "flagged"),
            AuthState::SignedOut => panic!("--user should count as signed in"),
        }
        assert_eq!(identity.input.borrow().position(), 0);
    }

    #[test]
    fn signed_out_reads_trimmed_user_id() {
        let identity = PromptIdentity::with_input(None, Cursor::new("  typed-user \nnext\n"));

        assert_eq!(identity.current(), AuthState::SignedOut);
        assert_eq!(identity.sign_in().unwrap().user_id.as_str(), "typed-user");
    }

    #[test]
    fn empty_input_and_bad_ids_fail_with_provider_codes() {
        let closed = PromptIdentity::with_input(None, Cursor::new(""));
        assert_eq!(closed.sign_in().unwrap_err().code, "auth/cancelled");

        let invalid = PromptIdentity::with_input(None, Cursor::new("has/slash\n"));
        assert_eq!(invalid.sign_in().unwrap_err().code, "auth/invalid-user-id");
    }
}
