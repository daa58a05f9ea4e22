use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);
    };
}

id_newtype!(ProductId);

/// One inventory line item as served by the dashboard endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub purchase_date: NaiveDate,
    pub unit_price: f64,
    pub quantity: u64,
    /// Days in stock. The backend leaves this out (or sends `null`) when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_age_days: Option<i64>,
}

impl Record {
    pub fn line_value(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }

    /// Stock age usable for averaging; negative ages are treated as unknown.
    pub fn valid_stock_age(&self) -> Option<i64> {
        self.stock_age_days.filter(|age| *age >= 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Table widgets report `1` for ascending and `-1` (or anything else) for descending.
    pub fn from_order(order: i8) -> Self {
        if order == 1 {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

/// Field and direction the remote listing is ordered by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new("purchaseDate", SortDirection::Desc)
    }
}
