//! Authentication constants.
//!
//! This module contains constant values used throughout the session layer.

/// Storage key under which the token pair is persisted.
pub const DEFAULT_TOKEN_KEY: &str = "concert_hub_tokens";

/// Auth endpoint paths, relative to the API base.
pub mod endpoints {
    /// Credential exchange.
    pub const LOGIN: &str = "/auth/login";

    /// Server-side token invalidation.
    pub const LOGOUT: &str = "/auth/logout";

    /// Refresh-token exchange.
    pub const REFRESH: &str = "/auth/refresh";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_relative() {
        for path in [endpoints::LOGIN, endpoints::LOGOUT, endpoints::REFRESH] {
            assert!(path.starts_with("/auth/"));
        }
    }
}
