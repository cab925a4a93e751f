//! Access
//!
//! Turns the current authentication state into what the storefront shows:
//! navigation links, the cart badge and whether the admin page may be opened.

/// Signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User id at the auth provider
    pub id: String,

    /// Email address
    pub email: String,
}

/// Authentication state reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The provider has not answered yet
    Loading,

    /// Nobody is signed in
    Anonymous,

    /// A user is signed in
    SignedIn {
        /// The user
        user: User,
        /// Whether the user holds the admin role
        is_admin: bool,
    },
}

impl AuthState {
    /// Whether the current user holds the admin role.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::SignedIn { is_admin: true, .. })
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::SignedIn { user, .. } => Some(user),
            Self::Loading | Self::Anonymous => None,
        }
    }
}

/// Supplies the current authentication state.
pub trait RoleProvider {
    /// Current state.
    fn auth_state(&self) -> AuthState;
}

/// Role provider that always reports the same state.
#[derive(Debug, Clone)]
pub struct StaticRoleProvider(AuthState);

impl StaticRoleProvider {
    /// Create a provider reporting `state`.
    pub fn new(state: AuthState) -> Self {
        Self(state)
    }
}

impl RoleProvider for StaticRoleProvider {
    fn auth_state(&self) -> AuthState {
        self.0.clone()
    }
}

/// Navigation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    /// Label
    pub name: &'static str,

    /// Route
    pub path: &'static str,
}

/// Home route, where refused admin visits are sent.
pub const HOME_PATH: &str = "/";

const HOME: NavLink = NavLink {
    name: "Home",
    path: HOME_PATH,
};

const SHOP: NavLink = NavLink {
    name: "Shop",
    path: "/products",
};

const ADMIN: NavLink = NavLink {
    name: "Admin",
    path: "/admin",
};

/// Links shown in the header. The admin link is only visible to admins.
pub fn navigation(state: &AuthState) -> Vec<NavLink> {
    let mut links = vec![HOME, SHOP];

    if state.is_admin() {
        links.push(ADMIN);
    }

    links
}

/// Outcome of opening the admin page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAccess {
    /// Auth state still loading; show a placeholder
    Pending,

    /// Admin; show the dashboard
    Granted,

    /// Not an admin; navigate away
    Redirect(&'static str),
}

/// Decide what the admin page does for the given state.
pub fn admin_access(state: &AuthState) -> AdminAccess {
    match state {
        AuthState::Loading => AdminAccess::Pending,
        _ if state.is_admin() => AdminAccess::Granted,
        AuthState::Anonymous | AuthState::SignedIn { .. } => AdminAccess::Redirect(HOME_PATH),
    }
}

/// Count shown on the cart icon; hidden for an empty cart.
pub fn cart_badge(item_count: u64) -> Option<u64> {
    (item_count > 0).then_some(item_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in(is_admin: bool) -> AuthState {
        AuthState::SignedIn {
            user: User {
                id: "u-1".to_string(),
                email: "shopper@example.com".to_string(),
            },
            is_admin,
        }
    }

    fn paths(state: &AuthState) -> Vec<&'static str> {
        navigation(state).iter().map(|link| link.path).collect()
    }

    #[test]
    fn navigation_hides_admin_link_from_non_admins() {
        assert_eq!(paths(&AuthState::Loading), ["/", "/products"]);
        assert_eq!(paths(&AuthState::Anonymous), ["/", "/products"]);
        assert_eq!(paths(&signed_in(false)), ["/", "/products"]);
    }

    #[test]
    fn navigation_shows_admin_link_to_admins() {
        assert_eq!(paths(&signed_in(true)), ["/", "/products", "/admin"]);
    }

    #[test]
    fn admin_access_per_state() {
        assert_eq!(admin_access(&AuthState::Loading), AdminAccess::Pending);
        assert_eq!(admin_access(&AuthState::Anonymous), AdminAccess::Redirect("/"));
        assert_eq!(admin_access(&signed_in(false)), AdminAccess::Redirect("/"));
        assert_eq!(admin_access(&signed_in(true)), AdminAccess::Granted);
    }

    #[test]
    fn cart_badge_hidden_when_empty() {
        assert_eq!(cart_badge(0), None);
        assert_eq!(cart_badge(4), Some(4));
    }

    #[test]
    fn static_provider_reports_its_state() {
        let provider = StaticRoleProvider::new(signed_in(true));

        assert!(provider.auth_state().is_admin());
        assert_eq!(
            provider.auth_state().user().map(|user| user.email.as_str()),
            Some("shopper@example.com")
        );
    }
}
