// ABOUTME: Product model with kind classification and measurement unit
// ABOUTME: Kind decides whether a product may expand into a sub-recipe
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Classification of a catalog product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Purchased or raw item, always a leaf
    Standard,
    /// Intermediate produced by its own recipe
    SemiProduct,
    /// Bundle of other products
    Kit,
}

impl ProductKind {
    /// Whether ingredient lines of this kind expand into their own recipe
    #[must_use]
    pub const fn is_expandable(self) -> bool {
        matches!(self, Self::SemiProduct | Self::Kit)
    }

    /// Wire name of the kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::SemiProduct => "semi_product",
            Self::Kit => "kit",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement unit of a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Counted items
    Piece,
    /// Mass in grams
    Gram,
}

impl Unit {
    /// Wire name of the unit
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Piece => "piece",
            Self::Gram => "gram",
        }
    }

    /// Short display label
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Piece => "pcs",
            Self::Gram => "g",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "piece" | "pcs" | "pc" => Ok(Self::Piece),
            "gram" | "g" => Ok(Self::Gram),
            other => Err(format!("unknown unit '{other}'")),
        }
    }
}

/// Catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Kind of product
    pub kind: ProductKind,
    /// Unit the product is measured in
    pub unit: Unit,
}

impl Product {
    /// Create a product
    pub fn new(id: Uuid, name: impl Into<String>, kind: ProductKind, unit: Unit) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            unit,
        }
    }
}
