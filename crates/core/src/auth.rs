//! Principals and the per-request context
//!
//! Archive queries run on behalf of a principal. Only a token-backed
//! [`Authorization`] is accepted; every other principal kind, and a
//! missing principal, fails closed with `UnsupportedAuthorizer`.

use std::fmt;
use std::sync::Arc;

use crate::error::{StrandError, StrandResult};
use crate::id::Id;

/// Kind reported by [`Authorization`]
pub const AUTHORIZATION_KIND: &str = "authorization";

/// Kind reported by [`Session`]
pub const SESSION_KIND: &str = "session";

/// Anything that can act on behalf of a caller
pub trait Authorizer: fmt::Debug + Send + Sync {
    /// Principal kind
    fn kind(&self) -> &str;

    /// The token-backed authorization, if that is what this principal is
    fn as_authorization(&self) -> Option<&Authorization> {
        None
    }
}

/// Token-backed principal
#[derive(Clone, PartialEq, Eq)]
pub struct Authorization {
    /// Authorization id
    pub id: Id,
    /// Organization the token belongs to
    pub org_id: Id,
    /// Opaque token
    pub token: String,
}

impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorization")
            .field("id", &self.id)
            .field("org_id", &self.org_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Authorizer for Authorization {
    fn kind(&self) -> &str {
        AUTHORIZATION_KIND
    }

    fn as_authorization(&self) -> Option<&Authorization> {
        Some(self)
    }
}

/// Interactive user session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session id
    pub id: Id,
    /// Logged-in user
    pub user_id: Id,
}

impl Authorizer for Session {
    fn kind(&self) -> &str {
        SESSION_KIND
    }
}

/// Ambient data carried with a request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    authorizer: Option<Arc<dyn Authorizer>>,
}

impl RequestContext {
    /// Context with no principal
    pub fn background() -> Self {
        Self::default()
    }

    /// Context acting as `authorizer`
    pub fn with_authorizer(authorizer: Arc<dyn Authorizer>) -> Self {
        RequestContext {
            authorizer: Some(authorizer),
        }
    }

    /// Principal, if any
    pub fn authorizer(&self) -> Option<&dyn Authorizer> {
        self.authorizer.as_deref()
    }

    /// The token-backed authorization required by archive queries
    ///
    /// # Errors
    ///
    /// `UnsupportedAuthorizer` when there is no principal or it is not of the
    /// "authorization" kind.
    pub fn authorization(&self) -> StrandResult<&Authorization> {
        let authorizer = self
            .authorizer()
            .ok_or(StrandError::UnsupportedAuthorizer { kind: None })?;
        if authorizer.kind() != AUTHORIZATION_KIND {
            return Err(StrandError::UnsupportedAuthorizer {
                kind: Some(authorizer.kind().to_string()),
            });
        }
        authorizer
            .as_authorization()
            .ok_or_else(|| StrandError::UnsupportedAuthorizer {
                kind: Some(authorizer.kind().to_string()),
            })
    }
}
