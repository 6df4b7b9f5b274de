//! Meeting room lookup (read-only to the booking core)

pub mod model;
pub mod repository;

pub use model::MeetingRoom;
pub use repository::RoomDirectory;
