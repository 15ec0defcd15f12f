// src/services/mod.rs

pub mod admin;
pub mod attempts;
pub mod catalog;
pub mod ranking;
pub mod scoring;
