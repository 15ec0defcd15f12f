// src/handlers/mod.rs

pub mod admin;
pub mod api;
pub mod auth;
pub mod catalog;
pub mod profile;
pub mod quiz;
