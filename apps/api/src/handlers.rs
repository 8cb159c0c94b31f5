pub mod account;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod health;
pub mod resource;
pub mod session;
