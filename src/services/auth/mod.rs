pub mod bearer;
pub mod factory;
pub mod keys;
pub mod rules;
pub mod scopes;
pub mod token;
pub mod verifier;

pub use factory::{build_key_store, build_verifier};
pub use keys::KeyStore;
pub use verifier::TokenVerifier;
