//! Ship and mine symbol templates
//!
//! Each template is a small JSON document with an outline polygon (for
//! rendering) and a hit radius (for proximity tests). Both templates must
//! load before a session can start; a failure is fatal.

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

/// Embedded copies used by native builds and tests
const SHIP_JSON: &str = include_str!("../assets/ship.json");
const MINE_JSON: &str = include_str!("../assets/mine.json");

/// Errors raised while loading templates
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset `{name}` not found")]
    Missing { name: String },

    #[error("asset `{name}` is not a valid template: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("asset `{name}` has invalid geometry: {reason}")]
    InvalidGeometry { name: String, reason: &'static str },

    #[error("expected template `{expected}`, found `{found}`")]
    WrongTemplate { expected: String, found: String },

    #[error("failed to fetch `{url}`: {message}")]
    Fetch { url: String, message: String },
}

/// A reusable symbol definition
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolTemplate {
    pub name: String,
    /// Hit radius at scale 1
    pub radius: f32,
    /// Outline polygon, centered on the symbol origin
    pub outline: Vec<Vec2>,
}

impl SymbolTemplate {
    /// Parse and validate a template document
    pub fn parse(name: &str, json: &str) -> Result<Self, AssetError> {
        if json.trim().is_empty() {
            return Err(AssetError::Missing {
                name: name.to_string(),
            });
        }

        let template: SymbolTemplate =
            serde_json::from_str(json).map_err(|source| AssetError::Malformed {
                name: name.to_string(),
                source,
            })?;

        if template.name != name {
            return Err(AssetError::WrongTemplate {
                expected: name.to_string(),
                found: template.name,
            });
        }
        if !template.radius.is_finite() || template.radius <= 0.0 {
            return Err(AssetError::InvalidGeometry {
                name: name.to_string(),
                reason: "radius must be a positive number",
            });
        }
        if template.outline.len() < 3 {
            return Err(AssetError::InvalidGeometry {
                name: name.to_string(),
                reason: "outline needs at least three points",
            });
        }

        Ok(template)
    }

    /// Distance from the origin to the farthest outline point, i.e. the
    /// radius that bounds the symbol at any rotation
    pub fn extent(&self) -> f32 {
        self.outline.iter().map(|p| p.length()).fold(0.0, f32::max)
    }
}

/// Both templates the game needs
#[derive(Debug, Clone)]
pub struct Templates {
    pub ship: SymbolTemplate,
    pub mine: SymbolTemplate,
}

impl Templates {
    /// Parse both templates from their JSON sources
    pub fn from_sources(ship_json: &str, mine_json: &str) -> Result<Self, AssetError> {
        let ship = SymbolTemplate::parse("ship", ship_json)?;
        let mine = SymbolTemplate::parse("mine", mine_json)?;
        log::info!(
            "Loaded templates: ship r={} ({} pts), mine r={} ({} pts)",
            ship.radius,
            ship.outline.len(),
            mine.radius,
            mine.outline.len()
        );
        Ok(Self { ship, mine })
    }

    /// Templates compiled into the binary
    pub fn embedded() -> Result<Self, AssetError> {
        Self::from_sources(SHIP_JSON, MINE_JSON)
    }
}

/// Fetch both templates from `base_url` (e.g. "assets")
#[cfg(target_arch = "wasm32")]
pub async fn fetch_templates(base_url: &str) -> Result<Templates, AssetError> {
    let ship = fetch_text(&format!("{base_url}/ship.json")).await?;
    let mine = fetch_text(&format!("{base_url}/mine.json")).await?;
    Templates::from_sources(&ship, &mine)
}

#[cfg(target_arch = "wasm32")]
async fn fetch_text(url: &str) -> Result<String, AssetError> {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    let fetch_error = |e: JsValue| AssetError::Fetch {
        url: url.to_string(),
        message: format!("{e:?}"),
    };

    let window = web_sys::window().ok_or_else(|| AssetError::Fetch {
        url: url.to_string(),
        message: "no window".to_string(),
    })?;

    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fetch_error)?
        .dyn_into()
        .map_err(fetch_error)?;

    if response.status() == 404 {
        return Err(AssetError::Missing {
            name: url.to_string(),
        });
    }
    if !response.ok() {
        return Err(AssetError::Fetch {
            url: url.to_string(),
            message: format!("HTTP {}", response.status()),
        });
    }

    let text = JsFuture::from(response.text().map_err(fetch_error)?)
        .await
        .map_err(fetch_error)?;
    text.as_string().ok_or_else(|| AssetError::Fetch {
        url: url.to_string(),
        message: "response body is not text".to_string(),
    })
}
