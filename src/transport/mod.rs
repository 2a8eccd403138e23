// src/transport/mod.rs
pub mod connector;
pub mod webhook;
