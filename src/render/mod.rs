// src/render/mod.rs
pub mod export;
pub mod plan;
pub mod text;
