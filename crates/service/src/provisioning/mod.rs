pub mod credentials;
pub mod errors;
pub mod service;
