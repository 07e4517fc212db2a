//! Account registry and bearer-token auth.

mod store;

pub use store::{AuthClaims, AuthError, AuthSession, AuthStore, UserSummary};
