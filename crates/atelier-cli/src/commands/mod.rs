//! Command handlers grouped by concern.

pub(crate) mod access;
pub(crate) mod auth;
pub(crate) mod likes;
