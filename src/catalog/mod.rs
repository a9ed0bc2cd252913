use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_SOURCE: &str = "https://miodeals.de/dealsgalaxy/products.json";
pub const DEFAULT_PLACEHOLDER_COUNT: usize = 40;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub title: String,
    pub current_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl Product {
    pub fn new(title: impl Into<String>, current_price: f64) -> Self {
        Self {
            title: title.into(),
            current_price,
            ..Self::default()
        }
    }

    // Tolerant per-record conversion. Only a missing title drops the record;
    // every other field degrades to absent (or 0 for the price).
    pub fn from_value(index: usize, value: &Value) -> Option<Self> {
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => {
                tracing::warn!(index, "skipping catalog record that is not an object");
                return None;
            }
        };

        let title = match obj.get("title").and_then(text_field) {
            Some(title) => title,
            None => {
                tracing::warn!(index, "skipping catalog record without a title");
                return None;
            }
        };

        let current_price = match obj.get("currentPrice").and_then(number_field) {
            Some(price) if price >= 0.0 => price,
            Some(price) => {
                tracing::warn!(index, %title, price, "negative currentPrice, using 0");
                0.0
            }
            None => {
                tracing::warn!(index, %title, "missing or invalid currentPrice, using 0");
                0.0
            }
        };

        Some(Self {
            title,
            current_price,
            old_price: obj.get("oldPrice").and_then(number_field),
            discount: obj.get("discount").and_then(number_field),
            category: obj.get("category").and_then(text_field),
            brand: obj.get("brand").and_then(text_field),
            description: obj.get("description").and_then(text_field),
            image: obj.get("image").and_then(text_field),
            url: obj.get("url").and_then(text_field),
            rating: obj.get("rating").and_then(number_field),
        })
    }
}

// Control characters never reach a sink: whitespace controls become a space,
// everything else (ESC, BEL, ...) is dropped.
fn text_field(value: &Value) -> Option<String> {
    let cleaned: String = value
        .as_str()?
        .chars()
        .filter_map(|c| match c {
            '\t' | '\n' | '\r' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();
    let s = cleaned.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn number_field(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
        _ => return None,
    };
    if n.is_finite() {
        Some(n)
    } else {
        None
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CatalogSource {
    Url(String),
    File(PathBuf),
    Inline(Vec<Product>),
}

impl CatalogSource {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(crate::config::expand_tilde(trimmed))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::File(path) => path.display().to_string(),
            Self::Inline(products) => format!("inline ({} records)", products.len()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadFailurePolicy {
    #[default]
    ShowError,
    Placeholder,
}

impl LoadFailurePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "error" | "show-error" => Some(Self::ShowError),
            "placeholder" | "fallback" => Some(Self::Placeholder),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShowError => "error",
            Self::Placeholder => "placeholder",
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to fetch catalog from {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("catalog request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog payload: {message}")]
    Malformed { message: String },
}

pub async fn load_catalog(
    source: &CatalogSource,
    client: &reqwest::Client,
) -> Result<Vec<Product>, CatalogError> {
    match source {
        CatalogSource::Url(url) => fetch_catalog(client, url).await,
        CatalogSource::File(path) => read_catalog(path).await,
        CatalogSource::Inline(products) => Ok(products.clone()),
    }
}

async fn fetch_catalog(client: &reqwest::Client, url: &str) -> Result<Vec<Product>, CatalogError> {
    tracing::info!(%url, "fetching catalog");
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| CatalogError::Fetch {
            url: url.to_string(),
            source: e,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let body = response.bytes().await.map_err(|e| CatalogError::Fetch {
        url: url.to_string(),
        source: e,
    })?;
    parse_products(&body)
}

async fn read_catalog(path: &Path) -> Result<Vec<Product>, CatalogError> {
    tracing::info!(path = %path.display(), "reading catalog file");
    let body = tokio::fs::read(path).await.map_err(|e| CatalogError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_products(&body)
}

pub fn parse_products(body: &[u8]) -> Result<Vec<Product>, CatalogError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| CatalogError::Malformed {
        message: e.to_string(),
    })?;
    let records = match value {
        Value::Array(records) => records,
        other => {
            return Err(CatalogError::Malformed {
                message: format!("expected a JSON array, got {}", json_kind(&other)),
            })
        }
    };

    let total = records.len();
    let products: Vec<Product> = records
        .iter()
        .enumerate()
        .filter_map(|(i, v)| Product::from_value(i, v))
        .collect();
    if products.len() != total {
        tracing::warn!(
            kept = products.len(),
            skipped = total - products.len(),
            "some catalog records were skipped"
        );
    }
    tracing::debug!(count = products.len(), "catalog parsed");
    Ok(products)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

const PLACEHOLDER_CATEGORIES: [&str; 5] = ["Technik", "Haushalt", "Mode", "Sport", "Spielzeug"];

/// Synthetic stand-in catalog used when loading fails under
/// [`LoadFailurePolicy::Placeholder`]. Deterministic so repeated runs match.
pub fn placeholder_catalog(count: usize) -> Vec<Product> {
    (1..=count)
        .map(|i| {
            let old_price = 20.0 + (i % 9) as f64 * 15.0;
            let cut = 0.1 + (i % 6) as f64 * 0.1;
            let current_price = ((old_price * (1.0 - cut)) * 100.0).round() / 100.0;
            Product {
                title: format!("Deal #{i}"),
                current_price,
                old_price: Some(old_price),
                discount: None,
                category: Some(
                    PLACEHOLDER_CATEGORIES[i % PLACEHOLDER_CATEGORIES.len()].to_string(),
                ),
                brand: None,
                description: None,
                image: Some(format!("https://picsum.photos/seed/deal{i}/400/400")),
                url: Some("#".to_string()),
                rating: Some(3.0 + (i % 5) as f64 * 0.5),
            }
        })
        .collect()
}
