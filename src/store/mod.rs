//! Local persistence: secure credentials, preferences and theme state.

pub mod credentials;
pub mod preferences;
pub mod secure;
pub mod theme;
