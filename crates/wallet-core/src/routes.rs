use std::fmt;

/// The four screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SeedSetup,
    Wallets,
    Send,
    Analytics,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::SeedSetup, Route::Wallets, Route::Send, Route::Analytics];

    /// Map a path to a screen. Unknown paths land on the wallet list.
    pub fn resolve(path: &str) -> Route {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::SeedSetup,
            "/wallets" => Route::Wallets,
            "/send-sol" => Route::Send,
            "/analytics" => Route::Analytics,
            _ => Route::Wallets,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::SeedSetup => "/",
            Route::Wallets => "/wallets",
            Route::Send => "/send-sol",
            Route::Analytics => "/analytics",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A navigation request. The sender key travels in memory and never
/// becomes part of the path.
#[derive(Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub sender_key: Option<String>,
}

impl Navigation {
    pub fn to(route: Route) -> Self {
        Self {
            route,
            sender_key: None,
        }
    }

    /// Go to the transfer screen pre-filled with `secret_key`.
    pub fn send_from(secret_key: impl Into<String>) -> Self {
        Self {
            route: Route::Send,
            sender_key: Some(secret_key.into()),
        }
    }
}

impl fmt::Debug for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigation")
            .field("route", &self.route)
            .field("sender_key", &self.sender_key.as_ref().map(|_| "***"))
            .finish()
    }
}
