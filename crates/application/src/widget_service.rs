use std::sync::Arc;

use backoffice_core::AppResult;
use backoffice_domain::{
    AdminUser, ResourceKey, Widget, WidgetCollector, WidgetPage, WidgetPosition,
};

use crate::{ResourceRegistry, WidgetProvider};

/// Application service aggregating dashboard and resource widgets.
#[derive(Clone)]
pub struct WidgetService {
    resources: Arc<ResourceRegistry>,
    dashboard: Vec<Arc<dyn WidgetProvider>>,
}

impl WidgetService {
    /// Creates a widget service.
    #[must_use]
    pub fn new(resources: Arc<ResourceRegistry>, dashboard: Vec<Arc<dyn WidgetProvider>>) -> Self {
        Self {
            resources,
            dashboard,
        }
    }

    /// Collects the widgets of every dashboard provider.
    pub async fn dashboard_widgets(&self, user: &AdminUser) -> AppResult<Vec<Widget>> {
        collect(&self.dashboard, user).await
    }

    /// Collects the widgets registered for a resource page slot.
    pub async fn resource_widgets(
        &self,
        resource: ResourceKey,
        page: WidgetPage,
        position: WidgetPosition,
        user: &AdminUser,
    ) -> AppResult<Vec<Widget>> {
        let definition = self.resources.get(resource)?;
        collect(definition.widget_providers(page, position), user).await
    }
}

async fn collect(providers: &[Arc<dyn WidgetProvider>], user: &AdminUser) -> AppResult<Vec<Widget>> {
    let mut collector = WidgetCollector::new();
    for provider in providers {
        provider.provide(user, &mut collector).await?;
    }

    Ok(collector.widgets())
}

#[cfg(test)]
mod tests;
