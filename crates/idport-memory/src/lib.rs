//! In-memory storage backend for the authorization and token engine.
//!
//! Backs every repository trait with `RwLock`-guarded maps. Intended for
//! tests and single-process deployments; nothing survives a restart.

mod application;
mod code;
mod token;
mod user;

pub use application::InMemoryApplicationRepository;
pub use code::InMemoryCodeRepository;
pub use token::InMemoryTokenRepository;
pub use user::InMemoryUserRepository;
