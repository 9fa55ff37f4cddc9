//! Auth-domain identifiers, the canonical user profile, and redacted secrets.

pub mod id;
pub mod profile;
pub mod secret;
pub mod token;

pub use id::*;
pub use profile::*;
pub use secret::*;
pub use token::*;
