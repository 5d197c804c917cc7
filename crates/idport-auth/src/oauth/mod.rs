//! The authorize and token endpoint state machines and their wire types.

pub mod authorize;
pub mod service;
pub mod token;

pub use authorize::{AuthorizationService, AuthorizeOutcome, AuthorizeRequest};
pub use service::TokenIssuanceService;
pub use token::{OAuthErrorResponse, TokenRequest, TokenResponse};
