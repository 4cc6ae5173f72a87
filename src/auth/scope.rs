/// Scope required to read leaderboards
pub const RANKING_SCOPE: &str = "ranking:read";

const WILDCARD: &str = "*";

/// Decide whether any granted scope satisfies `required`.
///
/// Scopes are `resource:action` pairs. Each component of a granted scope
/// matches exactly or through `*`; a bare `*` grants everything, and an empty
/// requirement is public.
pub fn allow<S: AsRef<str>>(required: &str, granted: &[S]) -> bool {
    if required.is_empty() {
        return true;
    }

    granted
        .iter()
        .any(|scope| scope_matches(required, scope.as_ref()))
}

fn scope_matches(required: &str, granted: &str) -> bool {
    if granted == WILDCARD || granted == required {
        return true;
    }

    match (required.split_once(':'), granted.split_once(':')) {
        (Some((resource, action)), Some((granted_resource, granted_action))) => {
            component_matches(resource, granted_resource) && component_matches(action, granted_action)
        }
        _ => false,
    }
}

fn component_matches(required: &str, granted: &str) -> bool {
    granted == WILDCARD || granted == required
}
