//! Auth-domain identifiers, roles, token secrets, and session models.

pub mod id;
pub mod role;
pub mod secret;
pub mod session;

pub use id::*;
pub use role::*;
pub use secret::*;
pub use session::*;
