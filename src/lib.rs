//! Fleet Session: session, onboarding and theme state for the fleet tracking app.

pub mod app;
pub mod auth;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod session;
pub mod store;
pub mod theme;
pub mod validation;
