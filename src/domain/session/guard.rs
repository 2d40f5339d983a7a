//! Route guards: who may open which view.

use std::fmt;
use std::str::FromStr;

use super::{Role, Session};

const SIGNED_IN: &[Role] = &[Role::Admin, Role::Issuer, Role::Student, Role::Verifier];
const ISSUING: &[Role] = &[Role::Issuer, Role::Admin];
const VERIFYING: &[Role] = &[Role::Verifier, Role::Admin];

/// Views of the front-end that guards decide on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    Dashboard,
    Admin,
    Issuer,
    Student,
    Verifier,
    Guest,
    ConnectWallet,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/",
            Route::Dashboard => "/dashboard",
            Route::Admin => "/admin",
            Route::Issuer => "/issuer",
            Route::Student => "/student",
            Route::Verifier => "/verifier",
            Route::Guest => "/guest",
            Route::ConnectWallet => "/connect-wallet",
        }
    }

    /// Roles allowed through; `None` means the route is open to anyone.
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            Route::SignIn | Route::Guest | Route::ConnectWallet => None,
            Route::Dashboard => Some(SIGNED_IN),
            Route::Admin => Some(&[Role::Admin][..]),
            Route::Issuer => Some(ISSUING),
            Route::Student => Some(&[Role::Student][..]),
            Route::Verifier => Some(VERIFYING),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let all = [
            Route::SignIn,
            Route::Dashboard,
            Route::Admin,
            Route::Issuer,
            Route::Student,
            Route::Verifier,
            Route::Guest,
            Route::ConnectWallet,
        ];
        let wanted = if s.starts_with('/') {
            s.to_string()
        } else {
            format!("/{}", s)
        };
        all.into_iter()
            .find(|r| r.path() == wanted)
            .ok_or_else(|| format!("unknown route: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    Redirect(Route),
}

/// Decides whether `session` may open `route`.
///
/// Signed-out access goes back to sign-in, a wrong role goes to the
/// dashboard (the guest view for guest sessions), and a student without a
/// connected wallet is sent to connect one. The outcome never redirects a
/// route to itself.
pub fn guard(session: Option<&Session>, route: Route) -> GuardOutcome {
    let Some(allowed) = route.allowed_roles() else {
        return GuardOutcome::Allow;
    };

    let session = match session {
        Some(s) if !s.token.is_empty() => s,
        _ => return GuardOutcome::Redirect(Route::SignIn),
    };

    if !allowed.contains(&session.role) {
        // Guests have no dashboard of their own.
        let fallback = if session.role == Role::Guest {
            Route::Guest
        } else {
            Route::Dashboard
        };
        let target = if fallback == route { Route::SignIn } else { fallback };
        return GuardOutcome::Redirect(target);
    }

    let has_wallet = session
        .address
        .as_deref()
        .is_some_and(|a| !a.trim().is_empty());
    if session.role == Role::Student && route == Route::Student && !has_wallet {
        return GuardOutcome::Redirect(Route::ConnectWallet);
    }

    GuardOutcome::Allow
}
