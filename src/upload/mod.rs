// src/upload/mod.rs
pub mod image;
