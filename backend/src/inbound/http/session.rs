//! Cookie session wrapper used by handlers.
//!
//! The session stores a [`SessionIdentity`] whose expiry is fixed at login.
//! Expiry is checked on every read, so refreshing the cookie never extends
//! the credential.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::{Actor, Error, SessionIdentity};

pub(crate) const IDENTITY_KEY: &str = "identity";

/// Newtype exposing identity-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the identity issued at login, rotating the session id.
    pub fn persist_identity(&self, identity: &SessionIdentity) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(IDENTITY_KEY, identity)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Current identity, or `None` when absent, unreadable or expired.
    ///
    /// Expired and unreadable identities are purged from the cookie.
    pub fn identity(&self, now: DateTime<Utc>) -> Result<Option<SessionIdentity>, Error> {
        let identity = match self.0.get::<SessionIdentity>(IDENTITY_KEY) {
            Ok(identity) => identity,
            Err(error) => {
                warn!(%error, "unreadable identity in session cookie");
                self.0.purge();
                return Ok(None);
            }
        };
        match identity {
            Some(identity) if identity.is_expired(now) => {
                debug!(user_id = %identity.user_id, "session identity expired");
                self.0.purge();
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Require a live identity or fail with `401 Unauthorized`.
    pub fn require_identity(&self, now: DateTime<Utc>) -> Result<SessionIdentity, Error> {
        self.identity(now)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require a live identity and reduce it to the acting user and role.
    pub fn require_actor(&self, now: DateTime<Utc>) -> Result<Actor, Error> {
        self.require_identity(now)
            .map(|identity| Actor::new(identity.user_id, identity.role))
    }

    /// Drop the session and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
