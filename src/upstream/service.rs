//! Upstream service identities.

use std::fmt;

/// One of the backend services behind the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    Auth,
    Film,
    Actor,
    Review,
    User,
    Bot,
}

impl Upstream {
    pub const ALL: [Upstream; 6] = [
        Upstream::Auth,
        Upstream::Film,
        Upstream::Actor,
        Upstream::Review,
        Upstream::User,
        Upstream::Bot,
    ];

    /// Stable name used in logs, metrics labels and config keys.
    pub fn name(self) -> &'static str {
        match self {
            Upstream::Auth => "auth",
            Upstream::Film => "film",
            Upstream::Actor => "actor",
            Upstream::Review => "review",
            Upstream::User => "user",
            Upstream::Bot => "bot",
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
