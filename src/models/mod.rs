// src/models/mod.rs

pub mod response;
pub mod user;
