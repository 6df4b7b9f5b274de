//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod notify;
pub mod storage;

pub use crypto::{JwtConfig, RandomCodeGenerator};
pub use database::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};
pub use notify::LogNotifier;
pub use storage::InMemoryRepositoryProvider;
