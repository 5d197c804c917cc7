//! Persistence trait abstractions.
//!
//! The engine owns no durable state. Users, applications, tokens, and
//! authorization codes live behind these traits; backends implement them
//! over whatever store they like. All traits are object-safe and
//! `Send + Sync` so services can hold them as `Arc<dyn Trait>`.

pub mod application;
pub mod code;
pub mod token;
pub mod user;

pub use application::ApplicationRepository;
pub use code::AuthorizationCodeRepository;
pub use token::TokenRepository;
pub use user::UserRepository;
