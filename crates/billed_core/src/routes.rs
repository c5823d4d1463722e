//! Logical views the application can navigate to.

use std::fmt;

/// A navigation destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign-in page.
    Login,
    /// The employee's bills list.
    Bills,
    /// The new-bill form.
    NewBill,
    /// The admin dashboard.
    Dashboard,
}

impl Route {
    /// Path used by the application router.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Bills => "#employee/bills",
            Self::NewBill => "#employee/bill/new",
            Self::Dashboard => "#admin/dashboard",
        }
    }

    /// Parses a router path back into a route.
    pub fn from_path(path: &str) -> Option<Self> {
        [Self::Login, Self::Bills, Self::NewBill, Self::Dashboard]
            .into_iter()
            .find(|route| route.path() == path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Callback that switches the displayed view.
///
/// Any `Fn(Route)` closure is a navigator, so tests can record navigation
/// with a captured vector.
pub trait Navigator: Send + Sync {
    /// Displays the view for `route`.
    fn navigate(&self, route: Route);
}

impl<F> Navigator for F
where
    F: Fn(Route) + Send + Sync,
{
    fn navigate(&self, route: Route) {
        self(route)
    }
}
