use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::{AppError, AppResult};
use backoffice_domain::{
    AdminUser, ListSchema, ResourceKey, Widget, WidgetCollector, WidgetPage, WidgetPosition,
    WidgetSize,
};
use serde_json::json;

use crate::test_support::{FakeRecordRepository, user};
use crate::{ResourceDefinition, ResourceRegistry, WidgetProvider};

use super::WidgetService;

struct StaticWidgets(Vec<(&'static str, i32)>);

#[async_trait]
impl WidgetProvider for StaticWidgets {
    async fn provide(&self, user: &AdminUser, collector: &mut WidgetCollector) -> AppResult<()> {
        for (name, priority) in &self.0 {
            collector.add(Widget::new(
                *name,
                "statistic",
                WidgetSize::Small,
                *priority,
                json!({"for": user.email().as_str()}),
            )?);
        }
        Ok(())
    }
}

fn service() -> WidgetService {
    let Ok(schema) = ListSchema::new(Vec::new(), None) else {
        panic!("schema should be valid");
    };
    let media = ResourceDefinition::new(
        ResourceKey::Media,
        Arc::new(FakeRecordRepository::default()),
        schema,
    )
    .with_widget(
        WidgetPage::List,
        WidgetPosition::Above,
        Arc::new(StaticWidgets(vec![("storage", 1)])),
    )
    .with_widget(
        WidgetPage::List,
        WidgetPosition::Above,
        Arc::new(StaticWidgets(vec![("uploads", 5)])),
    );
    let Ok(builder) = ResourceRegistry::builder().register(media) else {
        panic!("registry should build");
    };

    WidgetService::new(
        Arc::new(builder.build()),
        vec![
            Arc::new(StaticWidgets(vec![("users", 10), ("media", 20)])),
            Arc::new(StaticWidgets(vec![("welcome", 10)])),
        ],
    )
}

fn names(widgets: &[Widget]) -> Vec<&str> {
    widgets.iter().map(Widget::name).collect()
}

#[tokio::test]
async fn dashboard_widgets_are_ordered_by_priority() {
    let jane = user("jane@example.com", "admin", "secret");

    let widgets = service().dashboard_widgets(&jane).await;
    let Ok(widgets) = widgets else {
        panic!("dashboard should load");
    };

    assert_eq!(names(&widgets), vec!["media", "users", "welcome"]);
    assert_eq!(widgets[0].data()["for"], "jane@example.com");
}

#[tokio::test]
async fn resource_widgets_come_from_the_matching_slot() {
    let jane = user("jane@example.com", "admin", "secret");
    let service = service();

    let above = service
        .resource_widgets(ResourceKey::Media, WidgetPage::List, WidgetPosition::Above, &jane)
        .await;
    let below = service
        .resource_widgets(ResourceKey::Media, WidgetPage::List, WidgetPosition::Below, &jane)
        .await;

    assert_eq!(above.map(|widgets| names(&widgets).join(",")).ok(), Some("uploads,storage".to_owned()));
    assert!(below.is_ok_and(|widgets| widgets.is_empty()));
}

#[tokio::test]
async fn resource_widgets_of_unknown_resource_are_not_found() {
    let jane = user("jane@example.com", "admin", "secret");

    let result = service()
        .resource_widgets(ResourceKey::User, WidgetPage::Edit, WidgetPosition::Below, &jane)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
