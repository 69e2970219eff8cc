pub mod access;
pub mod jwt;
pub mod key_id;
pub mod last_token;
pub mod token_service;
