use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{error::ValidationError, ExampleData};

pub const DEFAULT_SHARE_URL: &str = "/share/ko58de";
pub const DEFAULT_CUSTOM_URL: &str = "/custom/8kqk7x";

/// Targets of the two quick link buttons in the navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickLinks {
    pub share_url: String,
    pub custom_url: String,
}

impl Default for QuickLinks {
    fn default() -> Self {
        Self {
            share_url: DEFAULT_SHARE_URL.to_owned(),
            custom_url: DEFAULT_CUSTOM_URL.to_owned(),
        }
    }
}

impl QuickLinks {
    /// Trims both links; neither may end up empty.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let share_url = self.share_url.trim();
        let custom_url = self.custom_url.trim();
        if share_url.is_empty() {
            return Err(ValidationError::EmptyQuickLink("shareUrl"));
        }
        if custom_url.is_empty() {
            return Err(ValidationError::EmptyQuickLink("customUrl"));
        }
        Ok(Self {
            share_url: share_url.to_owned(),
            custom_url: custom_url.to_owned(),
        })
    }
}

impl ExampleData for QuickLinks {
    fn example_data() -> Self {
        QuickLinks::default()
    }
}

const INTRO_DELAY: Duration = Duration::from_secs(5);
const LOADING_DELAY: Duration = Duration::from_secs(1);

/// Per-viewer state of a browsing session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerSession {
    pub has_loaded_intro: bool,
}

impl ViewerSession {
    /// Minimum time the loading screen stays up. The first load of a
    /// session plays the intro.
    pub fn loading_delay(&self) -> Duration {
        if self.has_loaded_intro {
            LOADING_DELAY
        } else {
            INTRO_DELAY
        }
    }

    /// The session after a completed load.
    pub fn loaded(self) -> Self {
        Self {
            has_loaded_intro: true,
        }
    }
}
