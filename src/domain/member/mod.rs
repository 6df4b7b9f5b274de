//! Member aggregate: identity lookup and the per-request caller context.

pub mod model;
pub mod repository;

pub use model::{Caller, Member, MemberRole};
pub use repository::MemberDirectory;
