//! Route handlers

pub mod commands;
pub mod health;
