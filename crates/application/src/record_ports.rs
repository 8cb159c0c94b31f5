use async_trait::async_trait;
use backoffice_core::{AppResult, UserId};
use backoffice_domain::{AdminRecord, AdminUser, Criteria, EmailAddress};

/// Repository port for the records of one resource.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Returns whether records are soft-deleted through `deletedAt`.
    fn supports_soft_delete(&self) -> bool;

    /// Lists records matching the criteria, honoring sort and pagination.
    async fn matching(&self, criteria: &Criteria) -> AppResult<Vec<AdminRecord>>;

    /// Counts records matching the criteria predicates.
    async fn count(&self, criteria: &Criteria) -> AppResult<usize>;

    /// Finds one record, including soft-deleted ones.
    async fn find(&self, id: &str) -> AppResult<Option<AdminRecord>>;

    /// Inserts or replaces a record.
    async fn save(&self, record: AdminRecord) -> AppResult<()>;

    /// Removes a record permanently.
    async fn delete(&self, id: &str) -> AppResult<()>;
}

/// Port for admin user lookups used by authentication and account messages.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<AdminUser>>;

    /// Finds a non-deleted user by email.
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<AdminUser>>;

    /// Returns whether another non-deleted user already uses the email.
    async fn email_taken_by_other(&self, email: &EmailAddress, user_id: UserId)
    -> AppResult<bool>;

    /// Inserts or replaces a user.
    async fn save(&self, user: &AdminUser) -> AppResult<()>;
}

/// Password hashing port.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}
