use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product the user is working toward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Decimal,

    // Optional link-preview payload, stored as-is
    pub image_data: Option<Vec<u8>>,
    pub source_url: Option<String>,

    /// Hours logged toward this product. May exceed the hours needed.
    pub hours_worked: Decimal,

    pub created_at: DateTime<Utc>,
}

/// For creating new products (no id, hours or timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub image_data: Option<Vec<u8>>,
    pub source_url: Option<String>,
}

impl NewProduct {
    pub fn new(
        name: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            price,
            ..Default::default()
        }
    }

    pub fn with_source_url(
        mut self,
        url: impl Into<String>,
    ) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_image_data(
        mut self,
        data: Vec<u8>,
    ) -> Self {
        self.image_data = Some(data);
        self
    }
}
