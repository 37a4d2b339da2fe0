//! Role directory and the capability matrix gating every mutation.
//!
//! Authorisation is a pure function of the caller's role, the attempted
//! action, and whether the caller owns the target record. Handlers and
//! services call [`ensure_allowed`] and never inspect roles directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::{Error, UserId};

/// Marketplace role assigned at registration. Immutable afterwards.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Books events against vendor services.
    #[default]
    Client,
    /// Offers services in the catalog.
    Vendor,
    /// Runs events on behalf of clients.
    Coordinator,
    /// Operator with override rights.
    Admin,
}

/// Raised when a role string is not one of the four known roles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    /// Stable lowercase label used for storage and sessions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Vendor => "vendor",
            Self::Coordinator => "coordinator",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "vendor" => Ok(Self::Vendor),
            "coordinator" => Ok(Self::Coordinator),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Mutations subject to the capability matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Publish a new catalog service.
    CreateService,
    /// Update or delete an existing service.
    ModifyService,
    /// Book a new event.
    CreateEvent,
    /// Change an event's status, coordinator or final cost.
    ModifyEvent,
    /// Remove an event.
    DeleteEvent,
}

impl Action {
    const fn describe(self) -> &'static str {
        match self {
            Self::CreateService => "create services",
            Self::ModifyService => "modify this service",
            Self::CreateEvent => "create events",
            Self::ModifyEvent => "modify events",
            Self::DeleteEvent => "delete this event",
        }
    }
}

/// Outcome of a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The action may proceed.
    Allow,
    /// The caller lacks the capability.
    Deny,
}

impl Decision {
    /// `true` when the action may proceed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Evaluate the capability matrix.
///
/// `is_owner` reports whether the caller owns the target record: the vendor
/// of a service or the client of an event. It is ignored for creation.
///
/// # Examples
/// ```
/// use backend::domain::{Action, Decision, Role, authorize};
///
/// assert_eq!(authorize(Role::Vendor, Action::ModifyService, false), Decision::Deny);
/// assert_eq!(authorize(Role::Admin, Action::ModifyService, false), Decision::Allow);
/// ```
#[must_use]
pub const fn authorize(role: Role, action: Action, is_owner: bool) -> Decision {
    let allowed = match action {
        Action::CreateService => matches!(role, Role::Vendor),
        Action::ModifyService => match role {
            Role::Admin => true,
            Role::Vendor => is_owner,
            Role::Client | Role::Coordinator => false,
        },
        Action::CreateEvent => matches!(role, Role::Client),
        Action::ModifyEvent => matches!(role, Role::Coordinator | Role::Admin),
        Action::DeleteEvent => match role {
            Role::Admin => true,
            Role::Client => is_owner,
            Role::Vendor | Role::Coordinator => false,
        },
    };
    if allowed { Decision::Allow } else { Decision::Deny }
}

/// Authenticated caller resolved from the session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Caller's user id.
    pub user_id: UserId,
    /// Caller's role.
    pub role: Role,
}

impl Actor {
    /// Construct an actor from a resolved identity.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Convert a denied capability check into a forbidden domain error.
pub fn ensure_allowed(actor: &Actor, action: Action, is_owner: bool) -> Result<(), Error> {
    if authorize(actor.role, action, is_owner).is_allowed() {
        return Ok(());
    }
    tracing::debug!(
        user_id = %actor.user_id,
        role = %actor.role,
        ?action,
        "capability check denied"
    );
    Err(Error::forbidden(format!(
        "{} may not {}",
        actor.role,
        action.describe()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ROLES: [Role; 4] = [Role::Client, Role::Vendor, Role::Coordinator, Role::Admin];

    #[rstest]
    #[case(Role::Client, false)]
    #[case(Role::Vendor, true)]
    #[case(Role::Coordinator, false)]
    #[case(Role::Admin, false)]
    fn only_vendors_create_services(#[case] role: Role, #[case] allowed: bool) {
        for is_owner in [true, false] {
            assert_eq!(
                authorize(role, Action::CreateService, is_owner).is_allowed(),
                allowed
            );
        }
    }

    #[rstest]
    #[case(Role::Vendor, true, true)]
    #[case(Role::Vendor, false, false)]
    #[case(Role::Admin, false, true)]
    #[case(Role::Client, true, false)]
    #[case(Role::Coordinator, true, false)]
    fn service_mutation_requires_ownership_or_admin(
        #[case] role: Role,
        #[case] is_owner: bool,
        #[case] allowed: bool,
    ) {
        assert_eq!(
            authorize(role, Action::ModifyService, is_owner).is_allowed(),
            allowed
        );
    }

    #[rstest]
    fn only_clients_create_events() {
        let allowed: Vec<Role> = ROLES
            .into_iter()
            .filter(|role| authorize(*role, Action::CreateEvent, false).is_allowed())
            .collect();
        assert_eq!(allowed, vec![Role::Client]);
    }

    #[rstest]
    fn coordinators_and_admins_modify_events() {
        let allowed: Vec<Role> = ROLES
            .into_iter()
            .filter(|role| authorize(*role, Action::ModifyEvent, true).is_allowed())
            .collect();
        assert_eq!(allowed, vec![Role::Coordinator, Role::Admin]);
    }

    #[rstest]
    #[case(Role::Client, true, true)]
    #[case(Role::Client, false, false)]
    #[case(Role::Admin, false, true)]
    #[case(Role::Coordinator, true, false)]
    fn event_deletion_requires_owning_client_or_admin(
        #[case] role: Role,
        #[case] is_owner: bool,
        #[case] allowed: bool,
    ) {
        assert_eq!(
            authorize(role, Action::DeleteEvent, is_owner).is_allowed(),
            allowed
        );
    }

    #[rstest]
    fn denial_maps_to_forbidden() {
        let actor = Actor::new(UserId::random(), Role::Client);
        let err = ensure_allowed(&actor, Action::CreateService, false).expect_err("denied");
        assert_eq!(err.kind(), crate::domain::ErrorKind::Forbidden);
        assert_eq!(err.message(), "client may not create services");
    }

    #[rstest]
    #[case("client", Role::Client)]
    #[case("coordinator", Role::Coordinator)]
    fn parses_known_roles(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(expected));
        assert_eq!(expected.as_str(), raw);
    }

    #[rstest]
    fn rejects_unknown_role() {
        assert_eq!(
            "superuser".parse::<Role>(),
            Err(UnknownRole("superuser".to_owned()))
        );
    }
}
