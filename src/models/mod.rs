// src/models/mod.rs

pub mod attempt;
pub mod banner;
pub mod course;
pub mod exam;
pub mod generation;
pub mod question;
pub mod topic;
