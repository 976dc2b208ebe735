//! Codec for the packed `info` column of a row.
//!
//! The column stores up to three fields in one string:
//!
//! ```text
//! <address>|||DESCRIPTION|||<description>|||URL|||<url>
//! ```
//!
//! Both sentinels are optional. Stored data depends on the exact tokens, so
//! this module is the only place that reads or writes them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ExampleData;

pub const DESCRIPTION_SENTINEL: &str = "|||DESCRIPTION|||";
pub const URL_SENTINEL: &str = "|||URL|||";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct InfoParts {
    pub address: String,
    pub description: String,
    pub url: String,
}

impl InfoParts {
    pub fn new(
        address: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            description: description.into(),
            url: url.into(),
        }
    }
}

impl ExampleData for InfoParts {
    fn example_data() -> Self {
        InfoParts::new(
            "Lot 12, Jalan Sultan Ismail",
            "Loading bay behind the lobby",
            "maps.example.com/lot12",
        )
    }
}

/// Splits a packed info string into its parts. Never fails: content in an
/// unexpected arrangement ends up in whichever part the splitting rules
/// assign it to.
pub fn decode_info(raw: &str) -> InfoParts {
    match raw.split_once(DESCRIPTION_SENTINEL) {
        Some((address, rest)) => {
            let (description, url) =
                rest.split_once(URL_SENTINEL).unwrap_or((rest, ""));
            InfoParts::new(address, description, url)
        }
        None => {
            let (address, url) = raw.split_once(URL_SENTINEL).unwrap_or((raw, ""));
            InfoParts::new(address, "", url)
        }
    }
}

/// Packs the parts into the stored representation, trimming each of them.
///
/// A url without a description is written as
/// `address|||DESCRIPTION||||||URL|||url`, keeping an empty description
/// section in front of the url sentinel. Existing data is written this way;
/// keep it.
pub fn encode_info(parts: &InfoParts) -> String {
    let description = parts.description.trim();
    let url = parts.url.trim();

    let mut packed = parts.address.trim().to_owned();
    if !description.is_empty() {
        packed.push_str(DESCRIPTION_SENTINEL);
        packed.push_str(description);
    }
    if !url.is_empty() {
        if description.is_empty() {
            packed.push_str(DESCRIPTION_SENTINEL);
        }
        packed.push_str(URL_SENTINEL);
        packed.push_str(url);
    }
    packed
}
