use std::sync::Arc;

use async_trait::async_trait;
use backoffice_application::{RecordRepository, WidgetProvider};
use backoffice_core::AppResult;
use backoffice_domain::{
    AdminUser, Criteria, DELETED_AT_FIELD, Predicate, Widget, WidgetCollector, WidgetSize,
};
use serde_json::json;

use super::repositories::RecordRepositorySet;

/// Counts the live records of one repository.
pub(super) struct RecordCountWidget {
    name: &'static str,
    label: &'static str,
    repository: Arc<dyn RecordRepository>,
    priority: i32,
}

impl RecordCountWidget {
    pub(super) fn new(
        name: &'static str,
        label: &'static str,
        repository: Arc<dyn RecordRepository>,
        priority: i32,
    ) -> Self {
        Self {
            name,
            label,
            repository,
            priority,
        }
    }
}

#[async_trait]
impl WidgetProvider for RecordCountWidget {
    async fn provide(&self, _user: &AdminUser, collector: &mut WidgetCollector) -> AppResult<()> {
        let mut criteria = Criteria::builder();
        if self.repository.supports_soft_delete() {
            criteria = criteria.and_where(Predicate::is_null(DELETED_AT_FIELD));
        }
        let count = self.repository.count(&criteria.build()).await?;

        collector.add(Widget::new(
            self.name,
            "statistic",
            WidgetSize::Small,
            self.priority,
            json!({"label": self.label, "count": count}),
        )?);
        Ok(())
    }
}

/// Greets the signed-in user at the top of the dashboard.
struct WelcomeWidget;

#[async_trait]
impl WidgetProvider for WelcomeWidget {
    async fn provide(&self, user: &AdminUser, collector: &mut WidgetCollector) -> AppResult<()> {
        collector.add(Widget::new(
            "welcome",
            "welcome",
            WidgetSize::Large,
            100,
            json!({"email": user.email().as_str(), "role": user.role()}),
        )?);
        Ok(())
    }
}

pub(super) fn dashboard_widgets(
    repositories: &RecordRepositorySet,
) -> Vec<Arc<dyn WidgetProvider>> {
    vec![
        Arc::new(WelcomeWidget),
        Arc::new(RecordCountWidget::new(
            "user-count",
            "Users",
            repositories.users.clone(),
            10,
        )),
        Arc::new(RecordCountWidget::new(
            "media-count",
            "Media",
            repositories.media.clone(),
            5,
        )),
    ]
}
