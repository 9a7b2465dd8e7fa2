// src/handlers/mod.rs

pub mod admin;
pub mod ai_generator;
pub mod attempt;
pub mod banner;
pub mod catalog;
