//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod in_memory_record_repository;
mod postgres_record_repository;
mod record_user_directory;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use in_memory_record_repository::InMemoryRecordRepository;
pub use postgres_record_repository::PostgresRecordRepository;
pub use record_user_directory::RecordUserDirectory;
