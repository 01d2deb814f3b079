pub mod access;
pub mod app;
pub mod auth;
pub mod config;
pub mod crops;
pub mod dto;
pub mod error;
pub mod expenses;
pub mod extract;
pub mod fields;
pub mod ledger;
pub mod patch;
pub mod revenue;
pub mod state;
