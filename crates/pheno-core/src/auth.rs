use thiserror::Error;

use crate::catalog::Catalog;
use crate::state::AuthMode;
use crate::state::Identity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub handle: String,
    pub password: String,
    pub avatar: Option<String>,
}

impl AuthForm {
    pub fn log_in(handle: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            mode: AuthMode::LogIn,
            handle: handle.into(),
            password: password.into(),
            avatar: None,
        }
    }

    pub fn sign_up(
        handle: impl Into<String>,
        password: impl Into<String>,
        avatar: Option<String>,
    ) -> Self {
        Self {
            mode: AuthMode::SignUp,
            handle: handle.into(),
            password: password.into(),
            avatar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Please fill in all fields")]
    MissingFields,
}

pub fn generated_avatar(handle: &str) -> String {
    format!("https://ui-avatars.com/api/?name={handle}&background=059669&color=fff&bold=true")
}

/// Turns a submitted form into the identity the session signs in as.
///
/// Log-in reuses a catalog account when the handle matches, otherwise a
/// throwaway session account is minted. Passwords are only checked for
/// presence.
pub fn resolve_identity(
    form: &AuthForm,
    catalog: &Catalog,
    now_ms: i64,
) -> Result<Identity, AuthError> {
    let handle = form.handle.trim();
    if handle.is_empty() || form.password.is_empty() {
        return Err(AuthError::MissingFields);
    }

    match form.mode {
        AuthMode::LogIn => Ok(catalog
            .identity_by_handle(handle)
            .cloned()
            .unwrap_or_else(|| {
                Identity::new(format!("session-{now_ms}"), handle, generated_avatar(handle))
            })),
        AuthMode::SignUp => {
            let avatar = form
                .avatar
                .clone()
                .filter(|avatar| !avatar.is_empty())
                .unwrap_or_else(|| generated_avatar(handle));
            Ok(Identity::new(format!("user-{now_ms}"), handle, avatar))
        }
    }
}
