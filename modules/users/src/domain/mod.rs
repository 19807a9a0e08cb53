pub mod credentials;
pub mod error;
pub mod repo;
pub mod service;
