//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod booking_repository;
pub mod member_repository;
pub mod repository_provider;
pub mod room_repository;

pub use booking_repository::SeaOrmBookingRepository;
pub use member_repository::SeaOrmMemberDirectory;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use room_repository::SeaOrmRoomDirectory;
