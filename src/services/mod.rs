// src/services/mod.rs

//! Store-level operations behind the HTTP handlers. Each function takes the
//! injected store handle and runs to completion within one request.

pub mod cascade;
pub mod comment;
pub mod community;
pub mod feed;
pub mod post;
pub mod tree;
pub mod user;
