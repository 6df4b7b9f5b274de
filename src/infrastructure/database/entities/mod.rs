//! SeaORM entities

pub mod booking;
pub mod meeting_room;
pub mod member;

pub use booking::Entity as Booking;
pub use meeting_room::Entity as MeetingRoom;
pub use member::Entity as Member;
