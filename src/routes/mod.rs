//! Route configuration, one router per surface.

pub mod api;
pub mod media;
