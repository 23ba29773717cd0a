use log::{info, warn, Level};
use serde::Deserialize;

use crate::components::nav::NavItem;
use crate::error::Result;
use crate::navigate::DEFAULT_HEADER_OFFSET_PX;
use crate::scroll::RateLimit;
use crate::spy::{Length, RootMargin, SpyOptions};

/// Id of the optional `<script type="application/json">` carrying overrides
pub const CONFIG_ELEMENT_ID: &str = "section-nav-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose tracker logging when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Everything the page navigation can be tuned with
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub sections: Vec<NavItem>,
    pub spy: SpyOptions,
    pub header_offset: f64,
    pub scroll: RateLimit,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            sections: vec![
                NavItem::new("hero", "Home"),
                NavItem::new("services", "Services"),
                NavItem::new("offers", "Offers"),
                NavItem::new("case-studies", "Case studies"),
                NavItem::new("process", "Process"),
                NavItem::new("contact", "Contact"),
            ],
            spy: SpyOptions {
                thresholds: vec![0.3],
                root_margin: RootMargin {
                    bottom: Length::Percent(-60.0),
                    ..RootMargin::default()
                },
                debounce_ms: 150,
                ..SpyOptions::default()
            },
            header_offset: DEFAULT_HEADER_OFFSET_PX,
            scroll: RateLimit::AnimationFrame,
        }
    }
}

impl SiteConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        if !config.header_offset.is_finite() {
            config.header_offset = DEFAULT_HEADER_OFFSET_PX;
        }
        Ok(config)
    }
}

/// Read the embedded config, falling back to defaults when it is absent or broken
pub fn load() -> SiteConfig {
    let Some(json) = embedded_json() else {
        return SiteConfig::default();
    };
    match SiteConfig::from_json(&json) {
        Ok(config) => {
            info!("Loaded navigation config with {} sections", config.sections.len());
            config
        }
        Err(err) => {
            warn!("{}, using defaults", err);
            SiteConfig::default()
        }
    }
}

fn embedded_json() -> Option<String> {
    web_sys::window()?
        .document()?
        .get_element_by_id(CONFIG_ELEMENT_ID)?
        .text_content()
}
