//! Caller identity: session tokens, user profiles, and the guest request quota.

pub mod quota;
pub mod session;

pub use quota::*;
pub use session::*;
