pub mod access_jwt;
pub mod claims;
pub mod credential_store;
pub mod factory;
pub mod jwt;
pub mod token_service;

pub use access_jwt::{TokenVerifier, VerifiedToken, VerifyToken};
pub use credential_store::CredentialStore;
pub use factory::build_token_service;
pub use jwt::TokenIssuer;
pub use token_service::TokenService;
