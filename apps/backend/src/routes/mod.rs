//! HTTP route handlers

pub mod grade;
pub mod reviews;
