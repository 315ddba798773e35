pub mod crypto;
pub mod error;
pub mod executor;
pub mod ozon_service;
pub mod retry;
pub mod transport;
