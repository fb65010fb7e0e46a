//! HTTP handlers

pub mod events;
pub mod health;
pub mod issues;
pub mod link_code;
pub mod screens;
