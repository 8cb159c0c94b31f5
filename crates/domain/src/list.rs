use std::fmt::{Display, Formatter};
use std::str::FromStr;

use backoffice_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Sort direction for list criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("asc") {
            Ok(Self::Asc)
        } else if value.eq_ignore_ascii_case("desc") {
            Ok(Self::Desc)
        } else {
            Err(AppError::Validation(format!(
                "unknown sort direction '{value}'"
            )))
        }
    }
}

impl Display for SortDirection {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One column of a resource list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListElement {
    name: NonEmptyString,
    searchable: bool,
}

impl ListElement {
    /// Creates a list column.
    pub fn new(name: impl Into<String>, searchable: bool) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            searchable,
        })
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns whether filter and search predicates may target this field.
    #[must_use]
    pub fn searchable(&self) -> bool {
        self.searchable
    }
}

/// Sort applied when a list request carries no explicit sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSort {
    field: NonEmptyString,
    direction: SortDirection,
}

impl DefaultSort {
    /// Creates a default sort directive.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> AppResult<Self> {
        Ok(Self {
            field: NonEmptyString::new(field)?,
            direction,
        })
    }

    /// Returns the sorted field.
    #[must_use]
    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    /// Returns the sort direction.
    #[must_use]
    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Declares which fields of a resource are listed, sortable and searchable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListSchema {
    elements: Vec<ListElement>,
    default_sort: Option<DefaultSort>,
}

impl ListSchema {
    /// Creates a list schema; element names must be unique.
    pub fn new(elements: Vec<ListElement>, default_sort: Option<DefaultSort>) -> AppResult<Self> {
        for (index, element) in elements.iter().enumerate() {
            if elements[..index]
                .iter()
                .any(|previous| previous.name() == element.name())
            {
                return Err(AppError::Validation(format!(
                    "duplicate list element '{}'",
                    element.name()
                )));
            }
        }

        Ok(Self {
            elements,
            default_sort,
        })
    }

    /// Returns the elements in declaration order.
    #[must_use]
    pub fn elements(&self) -> &[ListElement] {
        self.elements.as_slice()
    }

    /// Returns the element declared for a field.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&ListElement> {
        self.elements.iter().find(|element| element.name() == name)
    }

    /// Returns whether the field is declared.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.element(name).is_some()
    }

    /// Returns the searchable elements in declaration order.
    pub fn searchable_elements(&self) -> impl Iterator<Item = &ListElement> {
        self.elements.iter().filter(|element| element.searchable())
    }

    /// Returns the default sort, if any.
    #[must_use]
    pub fn default_sort(&self) -> Option<&DefaultSort> {
        self.default_sort.as_ref()
    }
}
