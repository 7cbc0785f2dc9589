pub mod entity;
pub mod kv;
pub mod kv_repo;
pub mod mapper;


pub use kv_repo::KvProfileRepository;
