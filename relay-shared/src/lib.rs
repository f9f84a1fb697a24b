#![cfg_attr(not(test), forbid(unsafe_code))]
#![warn(clippy::pedantic)]

//! Shared models, validation rules, and configuration for the Relay client.

pub mod config;
pub mod models;
pub mod validation;
