use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    geo::parse_coordinate,
    id::HasId,
    serde::string_or_number,
};

use crate::{
    info::{decode_info, encode_info, InfoParts},
    ExampleData, WithId,
};

/// `location` of the row used as the reference point for distances.
pub const ORIGIN_LOCATION: &str = "QL Kitchen";

/// Alternate-day delivery class of a row.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryAlt {
    #[default]
    Normal,
    Alt1,
    Alt2,
    Inactive,
}

impl DeliveryAlt {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryAlt::Normal => "normal",
            DeliveryAlt::Alt1 => "alt1",
            DeliveryAlt::Alt2 => "alt2",
            DeliveryAlt::Inactive => "inactive",
        }
    }
}

impl fmt::Display for DeliveryAlt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDeliveryAlt(pub String);

impl fmt::Display for UnknownDeliveryAlt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown delivery alternate '{}'", self.0)
    }
}

impl std::error::Error for UnknownDeliveryAlt {}

impl FromStr for DeliveryAlt {
    type Err = UnknownDeliveryAlt;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "normal" => Ok(DeliveryAlt::Normal),
            "alt1" => Ok(DeliveryAlt::Alt1),
            "alt2" => Ok(DeliveryAlt::Alt2),
            "inactive" => Ok(DeliveryAlt::Inactive),
            other => Err(UnknownDeliveryAlt(other.to_owned())),
        }
    }
}

fn default_active() -> bool {
    true
}

/// A delivery location.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub delivery: String,
    #[serde(default)]
    pub delivery_alt: DeliveryAlt,
    #[serde(default, deserialize_with = "string_or_number::deserialize_option")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_option")]
    pub longitude: Option<String>,
    #[serde(default)]
    pub info: String,
    #[serde(default = "default_active")]
    pub active: bool,
    pub marker_color: Option<String>,
    pub qr_code: Option<String>,
}

impl HasId for Row {
    type IdType = String;
}

impl Row {
    /// Whether this row is the distance reference point.
    pub fn is_origin(&self) -> bool {
        self.location == ORIGIN_LOCATION
    }

    /// Both coordinates, if present and numeric.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let latitude = parse_coordinate(self.latitude.as_deref())?;
        let longitude = parse_coordinate(self.longitude.as_deref())?;
        Some((latitude, longitude))
    }

    pub fn info_parts(&self) -> InfoParts {
        decode_info(&self.info)
    }

    pub fn set_info_parts(&mut self, parts: &InfoParts) {
        self.info = encode_info(parts);
    }

    /// The textual value of every field, as searched by the free text filter.
    pub fn search_values(&self) -> Vec<String> {
        let mut values = vec![
            self.route.clone(),
            self.code.clone(),
            self.location.clone(),
            self.delivery.clone(),
            self.delivery_alt.to_string(),
            self.latitude.clone().unwrap_or_default(),
            self.longitude.clone().unwrap_or_default(),
            self.info.clone(),
            self.active.to_string(),
        ];
        values.extend(self.marker_color.clone());
        values.extend(self.qr_code.clone());
        values
    }
}

impl WithId<Row> {
    /// Case-insensitive substring match against the id and every field.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        std::iter::once(self.id.raw())
            .chain(self.content.search_values())
            .any(|value| value.to_lowercase().contains(&term))
    }
}

impl ExampleData for Row {
    fn example_data() -> Self {
        Row {
            route: "KL 3".to_owned(),
            code: "42".to_owned(),
            location: "Menara Utama".to_owned(),
            delivery: "Daily".to_owned(),
            delivery_alt: DeliveryAlt::Alt1,
            latitude: Some("3.1390".to_owned()),
            longitude: Some("101.6869".to_owned()),
            info: "Lot 12, Jalan Sultan Ismail|||DESCRIPTION|||Loading bay behind the lobby"
                .to_owned(),
            active: true,
            marker_color: Some("#3388ff".to_owned()),
            qr_code: None,
        }
    }
}

/// Partial update of a row. `None` leaves a field untouched.
///
/// The info column can be replaced as a whole (`info`) or edited through its
/// parts (`address`, `description`, `url`); the parts are applied on top of
/// the decoded current value and re-encoded.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RowUpdate {
    pub route: Option<String>,
    pub code: Option<String>,
    pub location: Option<String>,
    pub delivery: Option<String>,
    pub delivery_alt: Option<DeliveryAlt>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_option")]
    pub latitude: Option<String>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_option")]
    pub longitude: Option<String>,
    pub info: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub active: Option<bool>,
    pub marker_color: Option<String>,
    pub qr_code: Option<String>,
}

impl RowUpdate {
    pub fn apply(self, mut row: Row) -> Row {
        if let Some(route) = self.route {
            row.route = route;
        }
        if let Some(code) = self.code {
            row.code = code;
        }
        if let Some(location) = self.location {
            row.location = location;
        }
        if let Some(delivery) = self.delivery {
            row.delivery = delivery;
        }
        if let Some(delivery_alt) = self.delivery_alt {
            row.delivery_alt = delivery_alt;
        }
        if let Some(latitude) = self.latitude {
            row.latitude = Some(latitude).filter(|value| !value.trim().is_empty());
        }
        if let Some(longitude) = self.longitude {
            row.longitude = Some(longitude).filter(|value| !value.trim().is_empty());
        }
        if let Some(info) = self.info {
            row.info = info;
        }
        if self.address.is_some() || self.description.is_some() || self.url.is_some() {
            let current = row.info_parts();
            row.set_info_parts(&InfoParts {
                address: self.address.unwrap_or(current.address),
                description: self.description.unwrap_or(current.description),
                url: self.url.unwrap_or(current.url),
            });
        }
        if let Some(active) = self.active {
            row.active = active;
        }
        if let Some(marker_color) = self.marker_color {
            row.marker_color = Some(marker_color).filter(|value| !value.is_empty());
        }
        if let Some(qr_code) = self.qr_code {
            row.qr_code = Some(qr_code).filter(|value| !value.is_empty());
        }
        row
    }
}
