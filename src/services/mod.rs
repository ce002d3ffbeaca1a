pub mod clock;
pub mod health_service;
pub mod id_generator;
pub mod paste_service;
pub mod store;
