//! Browser-side transport clients.
pub(crate) mod api;
