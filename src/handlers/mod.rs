// src/handlers/mod.rs

pub mod community;
pub mod post;
pub mod user;
