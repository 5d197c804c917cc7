//! Token production and lifecycle.

pub mod factory;
pub mod introspection;
pub mod jwt;
pub mod lifecycle;
pub mod revocation;

pub use factory::{SignedToken, TokenFactory};
pub use introspection::{IntrospectionRequest, IntrospectionResponse};
pub use jwt::{AccessTokenClaims, IdTokenClaims, JwtService};
pub use lifecycle::{TokenLifecycle, UserInfoResponse};
pub use revocation::{RevocationRequest, TokenTypeHint};
