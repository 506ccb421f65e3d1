// src/lib.rs

pub mod api;
pub mod auth;
pub mod community;
pub mod competition;
pub mod config;
pub mod error;
pub mod event;
pub mod report;
pub mod server;
pub mod state;
