use chrono::{DateTime, TimeZone, Utc};
use itertools::Itertools;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{id::HasId, id::Id, token::share_token};

use crate::{error::ValidationError, row::Row, ExampleData};

/// A named, ordered selection of rows, shared through `share_id`.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomTable {
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Member rows in display order. Rows deleted since are skipped when the
    /// membership is resolved.
    pub row_ids: Vec<Id<Row>>,
    pub share_id: String,
}

impl HasId for CustomTable {
    type IdType = String;
}

impl CustomTable {
    /// A new table with a fresh share token.
    pub fn create(
        input: NewCustomTable,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let input = input.validate()?;
        Ok(Self {
            name: input.name,
            description: input.description,
            created_at,
            row_ids: input.row_ids,
            share_id: share_token(),
        })
    }

    /// Replaces name, description and membership.
    pub fn update(&mut self, input: NewCustomTable) -> Result<(), ValidationError> {
        let input = input.validate()?;
        self.name = input.name;
        self.description = input.description;
        self.row_ids = input.row_ids;
        Ok(())
    }
}

impl ExampleData for CustomTable {
    fn example_data() -> Self {
        CustomTable {
            name: "Thursday north loop".to_owned(),
            description: Some("Machines north of the river".to_owned()),
            created_at: Utc.timestamp_opt(1714635000, 0).single().unwrap_or_default(),
            row_ids: vec![Id::new("0b9a2f64-2c8e-4c43-9d7b-1c0f4a6e9d11".to_owned())],
            share_id: "ko58de".to_owned(),
        }
    }
}

/// Body of the create and replace requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomTable {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub row_ids: Vec<Id<Row>>,
}

impl NewCustomTable {
    /// Trims the name and description. The name must not be empty and at
    /// least one row must be selected. A blank description is dropped and
    /// repeated row ids are kept once, at their first position.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.row_ids.is_empty() {
            return Err(ValidationError::NoRowsSelected);
        }
        Ok(Self {
            name: name.to_owned(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|description| !description.is_empty())
                .map(str::to_owned),
            row_ids: self.row_ids.into_iter().unique().collect(),
        })
    }
}

impl ExampleData for NewCustomTable {
    fn example_data() -> Self {
        let table = CustomTable::example_data();
        NewCustomTable {
            name: table.name,
            description: table.description,
            row_ids: table.row_ids,
        }
    }
}
