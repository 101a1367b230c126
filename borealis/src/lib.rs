#![warn(missing_debug_implementations)]

pub mod auth;
pub mod authority;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod session;
