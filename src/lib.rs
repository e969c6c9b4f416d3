// src/lib.rs

//! termo-watch: district heating outage monitor library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod publish;
pub mod services;
pub mod utils;
