pub mod http_client;
pub mod secure_storage;
