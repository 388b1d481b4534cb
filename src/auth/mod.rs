pub mod claims;
pub mod jwt;
pub mod session;

pub use claims::SessionClaims;
pub use jwt::decode_unverified;
pub use session::{CurrentUser, SessionProvider, TokenSession};
