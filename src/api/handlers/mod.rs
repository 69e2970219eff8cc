pub mod health;
pub mod token;
