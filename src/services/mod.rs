pub mod health;
pub mod timezone;
