// ABOUTME: Catalog error types for product and recipe storage operations
// ABOUTME: Covers missing records, rejected writes, and cycle rejections

use serde_json::json;
use uuid::Uuid;

use super::{AppError, ErrorCode};

/// Errors raised by the catalog store and its write-path validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Product does not exist
    #[error("Product {product_id} not found")]
    ProductNotFound {
        /// Missing product
        product_id: Uuid,
    },

    /// Recipe does not exist
    #[error("Recipe {recipe_id} not found")]
    RecipeNotFound {
        /// Missing recipe
        recipe_id: Uuid,
    },

    /// Product has no recipe producing it
    #[error("No recipe produces product {product_id}")]
    NoRecipeForProduct {
        /// Product looked up
        product_id: Uuid,
    },

    /// Saving the recipe would close a cycle in the dependency graph
    #[error("Circular dependency detected through {} products", path.len())]
    CycleDetected {
        /// Product ids along the cycle, first and last equal
        path: Vec<Uuid>,
    },

    /// Recipe failed one or more write-time rules
    #[error("Recipe validation failed: {}", errors.join("; "))]
    ValidationFailed {
        /// Every rule violation found
        errors: Vec<String>,
    },

    /// Write conflicts with existing data
    #[error("Catalog conflict: {message}")]
    Conflict {
        /// What conflicted
        message: String,
    },

    /// Backing store could not be read or written
    #[error("Catalog unavailable: {reason}")]
    Unavailable {
        /// Underlying failure
        reason: String,
    },
}

impl From<CatalogError> for AppError {
    fn from(error: CatalogError) -> Self {
        let (code, details) = match &error {
            CatalogError::ProductNotFound { product_id } => (
                ErrorCode::ResourceNotFound,
                json!({ "product_id": product_id }),
            ),
            CatalogError::RecipeNotFound { recipe_id } => (
                ErrorCode::ResourceNotFound,
                json!({ "recipe_id": recipe_id }),
            ),
            CatalogError::NoRecipeForProduct { product_id } => (
                ErrorCode::ResourceNotFound,
                json!({ "product_id": product_id }),
            ),
            CatalogError::CycleDetected { path } => {
                (ErrorCode::CircularDependency, json!({ "path": path }))
            }
            CatalogError::ValidationFailed { errors } => {
                (ErrorCode::RecipeValidationFailed, json!({ "errors": errors }))
            }
            CatalogError::Conflict { .. } => {
                (ErrorCode::ResourceAlreadyExists, serde_json::Value::Null)
            }
            CatalogError::Unavailable { .. } => {
                (ErrorCode::ResourceUnavailable, serde_json::Value::Null)
            }
        };
        Self::new(code, error.to_string())
            .with_details(details)
            .with_source(error)
    }
}
