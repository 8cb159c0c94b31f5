use std::sync::Arc;

use backoffice_core::AppResult;
use backoffice_domain::ResourceKey;
use serde::Serialize;
use serde_json::Value;

use crate::{QueryParams, ResourceRegistry, build_criteria};

/// One page of records plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResult {
    /// Public projections of the records on this page.
    pub items: Vec<Value>,
    /// Number of records matching the filters, ignoring offset and limit.
    pub count: usize,
}

/// Application service for resource list views.
#[derive(Clone)]
pub struct ResourceListService {
    registry: Arc<ResourceRegistry>,
}

impl ResourceListService {
    /// Creates a new list service over the resource registry.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self { registry }
    }

    /// Lists records of a resource according to the query parameters.
    pub async fn list(&self, resource: ResourceKey, params: &QueryParams) -> AppResult<ListResult> {
        let definition = self.registry.get(resource)?;
        let repository = definition.repository();
        let criteria = build_criteria(
            definition.list_schema(),
            params,
            repository.supports_soft_delete(),
        );

        let records = repository.matching(&criteria).await?;
        let count = repository.count(&criteria.for_count()).await?;

        tracing::debug!(
            resource = %resource,
            returned = records.len(),
            count,
            "listed resource records"
        );

        Ok(ListResult {
            items: records
                .iter()
                .map(|record| record.public_projection(definition.hidden_fields()))
                .collect(),
            count,
        })
    }
}
