pub mod access;
pub mod authenticate;
pub mod authorize;
pub mod chain;
