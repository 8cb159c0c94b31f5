use std::fmt::{Display, Formatter};
use std::str::FromStr;

use backoffice_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rendered width of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetSize {
    /// One third of the row.
    Small,
    /// Two thirds of the row.
    Medium,
    /// Full row.
    Large,
}

/// Resource page hosting widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetPage {
    /// Record list page.
    List,
    /// Record creation page.
    Create,
    /// Record edit page.
    Edit,
}

impl FromStr for WidgetPage {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "list" => Ok(Self::List),
            "create" => Ok(Self::Create),
            "edit" => Ok(Self::Edit),
            _ => Err(AppError::NotFound(format!("unknown widget page '{value}'"))),
        }
    }
}

impl Display for WidgetPage {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Edit => "edit",
        })
    }
}

/// Slot of a widget relative to the page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetPosition {
    /// Rendered above the page content.
    Above,
    /// Rendered below the page content.
    Below,
}

impl FromStr for WidgetPosition {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "above" => Ok(Self::Above),
            "below" => Ok(Self::Below),
            _ => Err(AppError::NotFound(format!(
                "unknown widget position '{value}'"
            ))),
        }
    }
}

impl Display for WidgetPosition {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::Above => "above",
            Self::Below => "below",
        })
    }
}

/// Widget payload rendered by the admin frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    name: NonEmptyString,
    widget_type: NonEmptyString,
    size: WidgetSize,
    priority: i32,
    data: Value,
}

impl Widget {
    /// Creates a validated widget.
    pub fn new(
        name: impl Into<String>,
        widget_type: impl Into<String>,
        size: WidgetSize,
        priority: i32,
        data: Value,
    ) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            widget_type: NonEmptyString::new(widget_type)?,
            size,
            priority,
            data,
        })
    }

    /// Returns widget name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the frontend component type.
    #[must_use]
    pub fn widget_type(&self) -> &str {
        self.widget_type.as_str()
    }

    /// Returns rendered width.
    #[must_use]
    pub fn size(&self) -> WidgetSize {
        self.size
    }

    /// Returns ordering priority; higher renders first.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns the component payload.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }
}

/// Gathers widgets from several providers.
#[derive(Debug, Clone, Default)]
pub struct WidgetCollector {
    widgets: Vec<Widget>,
}

impl WidgetCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one widget.
    pub fn add(&mut self, widget: Widget) {
        self.widgets.push(widget);
    }

    /// Returns collected widgets, highest priority first.
    #[must_use]
    pub fn widgets(mut self) -> Vec<Widget> {
        self.widgets
            .sort_by(|left, right| right.priority.cmp(&left.priority));
        self.widgets
    }
}
