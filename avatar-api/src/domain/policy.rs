use crate::domain::{models::UserId, Caller};

/// The actions exposed by the avatar surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarAction {
    ShowList,
    SelectPrimary,
    Upload,
    Delete,
    EnableGravatar,
    EnableDefault,
    DisableGravatar,
}

/// Outcome of the authorization policy, decided before the action body runs.
///
/// Failures are soft: anonymous callers are sent to the login flow, and
/// authenticated-but-unprivileged callers get a no-op redirect back to the
/// listing. Neither is reported as an error to the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    RedirectToLogin,
    RedirectNoop,
}

/// Single authorization policy for every avatar action.
///
/// Owner or administrator for everything; `Delete` additionally admits
/// moderators.
pub fn authorize(action: AvatarAction, caller: &Caller, owner: &UserId) -> AccessDecision {
    let Some(caller_id) = caller.id() else {
        return AccessDecision::RedirectToLogin;
    };

    let allowed = match action {
        AvatarAction::Delete => caller_id == *owner || caller.is_administrator_or_moderator(),
        _ => caller_id == *owner || caller.is_administrator(),
    };

    if allowed {
        AccessDecision::Allowed
    } else {
        AccessDecision::RedirectNoop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn owner() -> UserId {
        UserId::new(7)
    }

    #[test]
    fn anonymous_callers_are_sent_to_login() {
        for action in [
            AvatarAction::ShowList,
            AvatarAction::SelectPrimary,
            AvatarAction::Upload,
            AvatarAction::Delete,
            AvatarAction::EnableGravatar,
            AvatarAction::EnableDefault,
            AvatarAction::DisableGravatar,
        ] {
            assert_eq!(
                authorize(action, &Caller::anonymous(), &owner()),
                AccessDecision::RedirectToLogin
            );
        }
    }

    #[test]
    fn owner_is_allowed_regardless_of_role() {
        let caller = Caller::authenticated(owner(), Role::User);
        assert_eq!(
            authorize(AvatarAction::Upload, &caller, &owner()),
            AccessDecision::Allowed
        );
        assert_eq!(
            authorize(AvatarAction::Delete, &caller, &owner()),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn admin_is_allowed_on_other_users() {
        let caller = Caller::authenticated(UserId::new(1), Role::Admin);
        assert_eq!(
            authorize(AvatarAction::EnableGravatar, &caller, &owner()),
            AccessDecision::Allowed
        );
    }

    #[test]
    fn moderator_may_delete_but_not_mutate_otherwise() {
        let caller = Caller::authenticated(UserId::new(1), Role::Moderator);
        assert_eq!(
            authorize(AvatarAction::Delete, &caller, &owner()),
            AccessDecision::Allowed
        );
        assert_eq!(
            authorize(AvatarAction::SelectPrimary, &caller, &owner()),
            AccessDecision::RedirectNoop
        );
        assert_eq!(
            authorize(AvatarAction::ShowList, &caller, &owner()),
            AccessDecision::RedirectNoop
        );
    }

    #[test]
    fn unprivileged_non_owner_gets_noop_redirect() {
        let caller = Caller::authenticated(UserId::new(1), Role::User);
        assert_eq!(
            authorize(AvatarAction::Upload, &caller, &owner()),
            AccessDecision::RedirectNoop
        );
    }
}
