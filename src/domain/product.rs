use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Stock level below which a product is flagged as running out.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

const DEFAULT_RATING: f32 = 4.0;

fn default_rating() -> f32 {
    DEFAULT_RATING
}

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Shallots sold by the kilogram.
    Bawang,
    /// Seedlings ready for planting.
    Bibit,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bawang => "bawang",
            Category::Bibit => "bibit",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bawang" => Ok(Category::Bawang),
            "bibit" => Ok(Category::Bibit),
            other => Err(StoreError::ValidationError(format!("unknown category: {}", other))),
        }
    }
}

/// Represents a product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub price: u64,
    pub stock: u32,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default = "default_rating")]
    pub rating: f32,
    pub image: String,
}

impl Product {
    /// Filled stars for `floor(rating)` followed by empty stars up to five.
    pub fn star_rating(&self) -> String {
        let filled = (self.rating.floor().max(0.0) as usize).min(5);
        format!("{}{}", "⭐".repeat(filled), "☆".repeat(5 - filled))
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock < LOW_STOCK_THRESHOLD
    }
}

/// Unvalidated input for a new product, as collected by an admin form.
///
/// Numeric fields are signed and optional so that missing or negative input
/// reaches validation instead of being lost in parsing.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub price: Option<i64>,
    pub stock: Option<i64>,
    pub description: String,
    pub category: Category,
    pub rating: Option<f32>,
    pub image: Option<String>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: i64, stock: i64, category: Category) -> Self {
        Self {
            name: name.into(),
            price: Some(price),
            stock: Some(stock),
            description: String::new(),
            category,
            rating: None,
            image: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}
