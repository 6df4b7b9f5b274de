//! Room schedule endpoint

pub mod handlers;

pub use handlers::*;
