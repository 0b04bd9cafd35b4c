// src/handlers/mod.rs

pub mod auth;
pub mod comments;
pub mod health;
pub mod interaction;
pub mod posts;
pub mod profile;
