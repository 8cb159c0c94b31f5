use std::sync::Arc;

use backoffice_application::{ResourceDefinition, ResourceRegistry};
use backoffice_core::AppError;
use backoffice_domain::{
    DefaultSort, ListElement, ListSchema, MessageKind, ResourceKey, SortDirection, WidgetPage,
    WidgetPosition, user_fields,
};

use super::repositories::RecordRepositorySet;
use super::widgets::RecordCountWidget;

pub(super) fn build_resource_registry(
    repositories: &RecordRepositorySet,
) -> Result<ResourceRegistry, AppError> {
    let user_schema = ListSchema::new(
        vec![
            ListElement::new(user_fields::EMAIL, true)?,
            ListElement::new(user_fields::ROLE, false)?,
            ListElement::new(user_fields::STATUS, false)?,
            ListElement::new(user_fields::CREATED_AT, false)?,
        ],
        Some(DefaultSort::new(
            user_fields::CREATED_AT,
            SortDirection::Desc,
        )?),
    )?;

    let media_schema = ListSchema::new(
        vec![
            ListElement::new("name", true)?,
            ListElement::new("filename", true)?,
            ListElement::new("mimeType", false)?,
            ListElement::new("size", false)?,
            ListElement::new("createdAt", false)?,
        ],
        Some(DefaultSort::new("createdAt", SortDirection::Desc)?),
    )?;

    let users = ResourceDefinition::new(ResourceKey::User, repositories.users.clone(), user_schema)
        .with_create_message(MessageKind::CreateUser)
        .with_update_message(MessageKind::UpdateUser)
        .with_hidden_field(user_fields::PASSWORD_HASH)
        .with_widget(
            WidgetPage::List,
            WidgetPosition::Above,
            Arc::new(RecordCountWidget::new(
                "user-count",
                "Users",
                repositories.users.clone(),
                0,
            )),
        );

    let media =
        ResourceDefinition::new(ResourceKey::Media, repositories.media.clone(), media_schema)
            .with_widget(
                WidgetPage::List,
                WidgetPosition::Above,
                Arc::new(RecordCountWidget::new(
                    "media-count",
                    "Media",
                    repositories.media.clone(),
                    0,
                )),
            );

    Ok(ResourceRegistry::builder()
        .register(users)?
        .register(media)?
        .build())
}
