// ABOUTME: Calculation error types for hierarchy expansion and request validation
// ABOUTME: Cloneable so one failure can be shared with every coalesced waiter

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::{AppError, ErrorCode};
use crate::models::Unit;

/// Errors raised while resolving, expanding, or caching a calculation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    /// The requested recipe does not exist
    #[error("Recipe {recipe_id} not found")]
    RecipeNotFound {
        /// Missing recipe
        recipe_id: Uuid,
    },

    /// An ingredient line references a product missing from the catalog
    #[error("Product {product_id} not found")]
    ProductNotFound {
        /// Missing product
        product_id: Uuid,
    },

    /// Ingredient unit differs from the yield unit of the recipe it expands into
    #[error("Unit mismatch for recipe {recipe_id}: yield is in {expected}, ingredient uses {found}")]
    UnitMismatch {
        /// Recipe whose yield unit was expected
        recipe_id: Uuid,
        /// Unit of the recipe yield
        expected: Unit,
        /// Unit found on the ingredient line or request
        found: Unit,
    },

    /// Expansion revisited a product already on the active path
    #[error("Circular dependency detected: {}", format_path(path))]
    CycleDetected {
        /// Product ids along the cycle, first and last equal
        path: Vec<Uuid>,
    },

    /// Requested depth is above the configured hard limit
    #[error("Requested max depth {requested} exceeds limit {limit}")]
    MaxDepthExceeded {
        /// Depth from the request
        requested: u32,
        /// Configured limit
        limit: u32,
    },

    /// Target quantity is zero or negative
    #[error("Invalid quantity {value}: must be greater than zero")]
    InvalidQuantity {
        /// Offending quantity
        value: Decimal,
    },

    /// Requested precision is above the configured maximum
    #[error("Invalid precision {requested}: must be between 0 and {max}")]
    InvalidPrecision {
        /// Precision from the request
        requested: u32,
        /// Configured maximum
        max: u32,
    },

    /// Scale factor falls outside the configured bounds
    #[error("Scale factor {scale_factor} is outside the allowed range")]
    ScaleFactorOutOfRange {
        /// Computed scale factor
        scale_factor: Decimal,
        /// Lower bound, if configured
        min: Option<Decimal>,
        /// Upper bound, if configured
        max: Option<Decimal>,
    },

    /// Expansion visited more ingredient lines than allowed
    #[error("Calculation exceeds the limit of {limit} ingredient lines")]
    TooManyIngredients {
        /// Configured limit
        limit: usize,
    },

    /// A recipe in the hierarchy has a zero or negative yield
    #[error("Recipe {recipe_id} has a non-positive yield")]
    InvalidYield {
        /// Recipe with the bad yield
        recipe_id: Uuid,
    },

    /// Decimal arithmetic overflowed while scaling
    #[error("Arithmetic overflow while scaling recipe {recipe_id}")]
    Overflow {
        /// Recipe being scaled when the overflow happened
        recipe_id: Uuid,
    },

    /// The catalog snapshot could not be obtained
    #[error("Catalog unavailable: {reason}")]
    CatalogUnavailable {
        /// Underlying failure
        reason: String,
    },

    /// The calculation task failed unexpectedly
    #[error("Calculation task failed: {reason}")]
    Internal {
        /// Underlying failure
        reason: String,
    },
}

fn format_path(path: &[Uuid]) -> String {
    path.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl CalculationError {
    /// Stable name of the error variant, used in batch reports and logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RecipeNotFound { .. } => "RecipeNotFound",
            Self::ProductNotFound { .. } => "ProductNotFound",
            Self::UnitMismatch { .. } => "UnitMismatch",
            Self::CycleDetected { .. } => "CycleDetected",
            Self::MaxDepthExceeded { .. } => "MaxDepthExceeded",
            Self::InvalidQuantity { .. } => "InvalidQuantity",
            Self::InvalidPrecision { .. } => "InvalidPrecision",
            Self::ScaleFactorOutOfRange { .. } => "ScaleFactorOutOfRange",
            Self::TooManyIngredients { .. } => "TooManyIngredients",
            Self::InvalidYield { .. } => "InvalidYield",
            Self::Overflow { .. } => "Overflow",
            Self::CatalogUnavailable { .. } => "CatalogUnavailable",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Map to the application-wide error code
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::RecipeNotFound { .. } | Self::ProductNotFound { .. } => {
                ErrorCode::ResourceNotFound
            }
            Self::UnitMismatch { .. } => ErrorCode::UnitMismatch,
            Self::CycleDetected { .. } => ErrorCode::CircularDependency,
            Self::MaxDepthExceeded { .. } => ErrorCode::MaxDepthExceeded,
            Self::InvalidQuantity { .. } | Self::InvalidPrecision { .. } => {
                ErrorCode::ValueOutOfRange
            }
            Self::ScaleFactorOutOfRange { .. } => ErrorCode::ScaleFactorOutOfRange,
            Self::TooManyIngredients { .. } => ErrorCode::IngredientLimitExceeded,
            Self::InvalidYield { .. } => ErrorCode::RecipeValidationFailed,
            Self::Overflow { .. } => ErrorCode::ArithmeticOverflow,
            Self::CatalogUnavailable { .. } => ErrorCode::ResourceUnavailable,
            Self::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Structured fields of the error for response bodies
    #[must_use]
    pub fn details(&self) -> serde_json::Value {
        match self {
            Self::RecipeNotFound { recipe_id }
            | Self::InvalidYield { recipe_id }
            | Self::Overflow { recipe_id } => json!({ "recipe_id": recipe_id }),
            Self::ProductNotFound { product_id } => json!({ "product_id": product_id }),
            Self::UnitMismatch {
                recipe_id,
                expected,
                found,
            } => json!({ "recipe_id": recipe_id, "expected": expected, "found": found }),
            Self::CycleDetected { path } => json!({ "path": path }),
            Self::MaxDepthExceeded { requested, limit } => {
                json!({ "requested": requested, "limit": limit })
            }
            Self::InvalidQuantity { value } => json!({ "value": value }),
            Self::InvalidPrecision { requested, max } => {
                json!({ "requested": requested, "max": max })
            }
            Self::ScaleFactorOutOfRange {
                scale_factor,
                min,
                max,
            } => json!({ "scale_factor": scale_factor, "min": min, "max": max }),
            Self::TooManyIngredients { limit } => json!({ "limit": limit }),
            Self::CatalogUnavailable { reason } | Self::Internal { reason } => {
                json!({ "reason": reason })
            }
        }
    }

    /// Serializable summary used for failed batch items
    #[must_use]
    pub fn report(&self) -> CalculationErrorReport {
        CalculationErrorReport {
            kind: self.kind(),
            code: self.error_code(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}

/// Serializable form of a [`CalculationError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationErrorReport {
    /// Variant name such as `UnitMismatch`
    pub kind: &'static str,
    /// Application error code
    pub code: ErrorCode,
    /// Human readable message
    pub message: String,
    /// Structured fields
    pub details: serde_json::Value,
}

impl From<CalculationError> for AppError {
    fn from(error: CalculationError) -> Self {
        let mut details = error.details();
        if let Some(map) = details.as_object_mut() {
            map.insert("kind".to_owned(), json!(error.kind()));
        }
        Self::new(error.error_code(), error.to_string())
            .with_details(details)
            .with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let error = CalculationError::CycleDetected {
            path: vec![a, b, a],
        };
        assert_eq!(
            error.to_string(),
            format!("Circular dependency detected: {a} -> {b} -> {a}")
        );
        assert_eq!(error.details()["path"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_app_error_conversion_carries_kind() {
        let error = CalculationError::UnitMismatch {
            recipe_id: Uuid::from_u128(7),
            expected: Unit::Gram,
            found: Unit::Piece,
        };
        let app: AppError = error.into();
        assert_eq!(app.code, ErrorCode::UnitMismatch);
        assert_eq!(app.details["kind"], "UnitMismatch");
        assert_eq!(app.details["expected"], "gram");
        assert_eq!(app.http_status(), 422);
    }
}
