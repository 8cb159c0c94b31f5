use std::sync::Arc;

use async_trait::async_trait;
use backoffice_application::{RecordRepository, UserDirectory};
use backoffice_core::{AppResult, UserId};
use backoffice_domain::{
    AdminUser, Criteria, CriteriaBuilder, DELETED_AT_FIELD, EmailAddress, ID_FIELD, Predicate,
    user_fields,
};

/// User directory reading admin users from the `user` resource records.
#[derive(Clone)]
pub struct RecordUserDirectory {
    records: Arc<dyn RecordRepository>,
}

impl RecordUserDirectory {
    /// Creates a directory over the user record repository.
    #[must_use]
    pub fn new(records: Arc<dyn RecordRepository>) -> Self {
        Self { records }
    }

    async fn first_matching(&self, criteria: Criteria) -> AppResult<Option<AdminUser>> {
        self.records
            .matching(&criteria)
            .await?
            .first()
            .map(AdminUser::from_record)
            .transpose()
    }
}

fn live_users_with_email(email: &EmailAddress) -> CriteriaBuilder {
    Criteria::builder()
        .and_where(Predicate::is_null(DELETED_AT_FIELD))
        .and_where(Predicate::equals(user_fields::EMAIL, email.as_str()))
        .max_results(1)
}

#[async_trait]
impl UserDirectory for RecordUserDirectory {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<AdminUser>> {
        self.records
            .find(&user_id.to_string())
            .await?
            .as_ref()
            .map(AdminUser::from_record)
            .transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<AdminUser>> {
        self.first_matching(live_users_with_email(email).build())
            .await
    }

    async fn email_taken_by_other(
        &self,
        email: &EmailAddress,
        user_id: UserId,
    ) -> AppResult<bool> {
        let criteria = live_users_with_email(email)
            .and_where(Predicate::not_equals(ID_FIELD, user_id.to_string()))
            .build();

        Ok(self.first_matching(criteria).await?.is_some())
    }

    async fn save(&self, user: &AdminUser) -> AppResult<()> {
        tracing::debug!(user_id = %user.id(), "saving admin user");
        self.records.save(user.to_record()?).await
    }
}
