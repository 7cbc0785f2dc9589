pub mod document;
pub mod error;
pub mod fields;
pub mod proximity;
pub mod repo;
pub mod service;
