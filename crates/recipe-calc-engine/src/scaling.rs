// ABOUTME: Hierarchy expansion that scales a recipe and every sub-recipe to a target yield
// ABOUTME: Iterative with an explicit frame stack, path-set cycle guard, and late rounding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Scaling Engine
//!
//! Expands a recipe into the quantities of every leaf product needed for a target
//! yield. Expandable ingredients (semi-products and kits that own a recipe) are
//! scaled recursively; leaves are folded into a flat list keyed by product and unit.
//!
//! Recursion is driven by an explicit stack of [`Frame`]s so stack usage does not
//! depend on hierarchy depth, and the set of products on the active path turns cycle
//! detection into a set lookup. Scale factors stay at full precision through every
//! level; rounding happens once per flattened leaf and once per tree node.

use std::collections::{HashMap, HashSet};
use std::iter;

use recipe_calc_core::constants::calculation::ALGORITHM_VERSION;
use recipe_calc_core::errors::CalculationError;
use recipe_calc_core::models::{CatalogReader, Product, Recipe, RecipeIngredient, Unit};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::request::{CalculationRequest, ResolvedRequest};
use crate::result::{CalculatedIngredient, CalculationMetadata, CalculationResult, HierarchyNode};
use crate::rounding::round_quantity;

/// Stateless scaling engine parameterized by its limits
#[derive(Debug, Clone, Default)]
pub struct ScalingEngine {
    config: EngineConfig,
}

/// One recipe being expanded
struct Frame<'c> {
    recipe: &'c Recipe,
    scale: Decimal,
    depth: u32,
    lines: Vec<&'c RecipeIngredient>,
    next: usize,
    children: Vec<HierarchyNode>,
    /// Tree node of the parent line that expanded into this frame
    node: Option<HierarchyNode>,
}

impl<'c> Frame<'c> {
    fn new(recipe: &'c Recipe, scale: Decimal, depth: u32, node: Option<HierarchyNode>) -> Self {
        Self {
            recipe,
            scale,
            depth,
            lines: recipe.ordered_ingredients(),
            next: 0,
            children: Vec::new(),
            node,
        }
    }
}

struct FlatEntry<'c> {
    product: &'c Product,
    unit: Unit,
    quantity: Decimal,
    depth: u32,
}

/// Leaf accumulator preserving first-appearance order
#[derive(Default)]
struct FlatList<'c> {
    entries: Vec<FlatEntry<'c>>,
    index: HashMap<(Uuid, Unit), usize>,
}

impl<'c> FlatList<'c> {
    fn add(
        &mut self,
        product: &'c Product,
        unit: Unit,
        quantity: Decimal,
        depth: u32,
        recipe_id: Uuid,
    ) -> Result<(), CalculationError> {
        if let Some(&position) = self.index.get(&(product.id, unit)) {
            let entry = &mut self.entries[position];
            entry.quantity = entry
                .quantity
                .checked_add(quantity)
                .ok_or(CalculationError::Overflow { recipe_id })?;
            entry.depth = entry.depth.min(depth);
        } else {
            self.index.insert((product.id, unit), self.entries.len());
            self.entries.push(FlatEntry {
                product,
                unit,
                quantity,
                depth,
            });
        }
        Ok(())
    }

    fn finish(self, precision: u32) -> Vec<CalculatedIngredient> {
        self.entries
            .into_iter()
            .map(|entry| CalculatedIngredient {
                product_id: entry.product.id,
                product_name: entry.product.name.clone(),
                kind: entry.product.kind,
                calculated_quantity: round_quantity(entry.quantity, precision),
                unit: entry.unit,
                depth: entry.depth,
            })
            .collect()
    }
}

/// Product plus the recipe it expands into, if it is expandable and has one
type ResolvedProduct<'c> = (&'c Product, Option<&'c Recipe>);

/// Everything produced by one expansion pass
struct Expansion {
    ingredients: Vec<CalculatedIngredient>,
    hierarchy: Vec<HierarchyNode>,
    truncated: bool,
    lines_visited: usize,
    expanded_recipes: usize,
}

impl ScalingEngine {
    /// Create an engine with the given limits
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Limits in effect
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply defaults and check request-level limits
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity`, `InvalidPrecision` or `MaxDepthExceeded`
    pub fn resolve(&self, request: &CalculationRequest) -> Result<ResolvedRequest, CalculationError> {
        if request.target_quantity <= Decimal::ZERO {
            return Err(CalculationError::InvalidQuantity {
                value: request.target_quantity,
            });
        }

        let precision = request
            .options
            .precision
            .unwrap_or(self.config.default_precision);
        if precision > self.config.max_precision {
            return Err(CalculationError::InvalidPrecision {
                requested: precision,
                max: self.config.max_precision,
            });
        }

        let max_depth = request
            .options
            .max_depth
            .unwrap_or(self.config.default_max_depth);
        if max_depth > self.config.max_depth_limit {
            return Err(CalculationError::MaxDepthExceeded {
                requested: max_depth,
                limit: self.config.max_depth_limit,
            });
        }

        // Equal quantities written with different scales must resolve identically.
        Ok(ResolvedRequest {
            recipe_id: request.recipe_id,
            target_quantity: request.target_quantity.normalize(),
            target_unit: request.target_unit,
            max_depth,
            precision,
            include_hierarchy: request.options.include_hierarchy,
        })
    }

    /// Resolve and calculate in one step
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::resolve`] or [`Self::calculate`]
    pub fn calculate_request<C>(
        &self,
        catalog: &C,
        request: &CalculationRequest,
    ) -> Result<CalculationResult, CalculationError>
    where
        C: CatalogReader + ?Sized,
    {
        let resolved = self.resolve(request)?;
        self.calculate(catalog, &resolved)
    }

    /// Scale a recipe hierarchy to the requested quantity
    ///
    /// # Errors
    ///
    /// Fails without a partial result on a missing recipe or product, a unit
    /// mismatch at any level, a cycle, an out-of-range scale factor, the ingredient
    /// budget being exhausted, or decimal overflow.
    pub fn calculate<C>(
        &self,
        catalog: &C,
        request: &ResolvedRequest,
    ) -> Result<CalculationResult, CalculationError>
    where
        C: CatalogReader + ?Sized,
    {
        let recipe = catalog
            .get_recipe(request.recipe_id)
            .ok_or(CalculationError::RecipeNotFound {
                recipe_id: request.recipe_id,
            })?;

        if request.target_unit != recipe.yield_unit {
            return Err(CalculationError::UnitMismatch {
                recipe_id: recipe.id,
                expected: recipe.yield_unit,
                found: request.target_unit,
            });
        }
        if recipe.yield_quantity <= Decimal::ZERO {
            return Err(CalculationError::InvalidYield {
                recipe_id: recipe.id,
            });
        }

        let scale_factor = request
            .target_quantity
            .checked_div(recipe.yield_quantity)
            .ok_or(CalculationError::Overflow {
                recipe_id: recipe.id,
            })?;
        self.check_scale_bounds(scale_factor)?;

        let product_name = catalog
            .get_product(recipe.product_id)
            .map(|product| product.name.clone())
            .unwrap_or_else(|| recipe.name.clone());

        let expansion = self.expand(catalog, recipe, scale_factor, request)?;
        let (total_weight, total_pieces) = totals(&expansion.ingredients, recipe.id)?;

        debug!(
            recipe_id = %recipe.id,
            %scale_factor,
            lines = expansion.lines_visited,
            expanded = expansion.expanded_recipes,
            truncated = expansion.truncated,
            "Recipe expansion complete"
        );

        Ok(CalculationResult {
            recipe_id: recipe.id,
            recipe_version: recipe.version,
            product_id: recipe.product_id,
            product_name,
            original_yield: recipe.yield_quantity.normalize(),
            original_yield_unit: recipe.yield_unit,
            target_quantity: request.target_quantity,
            target_unit: request.target_unit,
            scale_factor: scale_factor.normalize(),
            ingredients: expansion.ingredients,
            hierarchy: request.include_hierarchy.then_some(expansion.hierarchy),
            truncated: expansion.truncated,
            total_weight,
            total_pieces,
            metadata: CalculationMetadata {
                include_hierarchy: request.include_hierarchy,
                max_depth: request.max_depth,
                precision: request.precision,
                ingredient_count: expansion.lines_visited,
                expanded_recipes: expansion.expanded_recipes,
                algorithm_version: ALGORITHM_VERSION.to_owned(),
            },
        })
    }

    fn check_scale_bounds(&self, scale_factor: Decimal) -> Result<(), CalculationError> {
        let below = self
            .config
            .min_scale_factor
            .is_some_and(|min| scale_factor < min);
        let above = self
            .config
            .max_scale_factor
            .is_some_and(|max| scale_factor > max);
        if below || above {
            return Err(CalculationError::ScaleFactorOutOfRange {
                scale_factor,
                min: self.config.min_scale_factor,
                max: self.config.max_scale_factor,
            });
        }
        Ok(())
    }

    fn expand<'c, C>(
        &self,
        catalog: &'c C,
        root: &'c Recipe,
        scale_factor: Decimal,
        request: &ResolvedRequest,
    ) -> Result<Expansion, CalculationError>
    where
        C: CatalogReader + ?Sized,
    {
        let mut lookups: HashMap<Uuid, ResolvedProduct<'c>> = HashMap::new();
        let mut flat = FlatList::default();
        let mut on_path: HashSet<Uuid> = HashSet::from([root.product_id]);
        let mut stack = vec![Frame::new(root, scale_factor, 0, None)];
        let mut hierarchy = Vec::new();
        let mut truncated = false;
        let mut lines_visited = 0_usize;
        let mut expanded_recipes = 0_usize;

        while let Some(frame) = stack.last_mut() {
            let Some(line) = frame.lines.get(frame.next).copied() else {
                let Some(done) = stack.pop() else { break };
                on_path.remove(&done.recipe.product_id);
                match (done.node, stack.last_mut()) {
                    (Some(mut node), Some(parent)) => {
                        node.sub_ingredients = done.children;
                        parent.children.push(node);
                    }
                    (_, None) => hierarchy = done.children,
                    (None, Some(_)) => {}
                }
                continue;
            };
            frame.next += 1;
            let (scale, depth, owner) = (frame.scale, frame.depth, frame.recipe);

            lines_visited += 1;
            if lines_visited > self.config.max_ingredients {
                return Err(CalculationError::TooManyIngredients {
                    limit: self.config.max_ingredients,
                });
            }

            let quantity = line
                .quantity
                .checked_mul(scale)
                .ok_or(CalculationError::Overflow {
                    recipe_id: owner.id,
                })?;
            let (product, sub_recipe) = resolve_product(catalog, &mut lookups, line)?;

            if on_path.contains(&product.id) {
                return Err(CalculationError::CycleDetected {
                    path: cycle_path(&stack, product.id),
                });
            }

            let mut node = request.include_hierarchy.then(|| HierarchyNode {
                product_id: product.id,
                product_name: product.name.clone(),
                kind: product.kind,
                calculated_quantity: round_quantity(quantity, request.precision),
                unit: line.unit,
                order: line.order,
                depth,
                expanded: false,
                truncated: false,
                sub_ingredients: Vec::new(),
            });

            match sub_recipe {
                Some(sub) if depth < request.max_depth => {
                    if line.unit != sub.yield_unit {
                        return Err(CalculationError::UnitMismatch {
                            recipe_id: sub.id,
                            expected: sub.yield_unit,
                            found: line.unit,
                        });
                    }
                    if sub.yield_quantity <= Decimal::ZERO {
                        return Err(CalculationError::InvalidYield { recipe_id: sub.id });
                    }
                    let sub_scale = quantity
                        .checked_div(sub.yield_quantity)
                        .ok_or(CalculationError::Overflow { recipe_id: sub.id })?;
                    if let Some(node) = node.as_mut() {
                        node.expanded = true;
                    }
                    expanded_recipes += 1;
                    on_path.insert(product.id);
                    stack.push(Frame::new(sub, sub_scale, depth + 1, node));
                }
                other => {
                    if other.is_some() {
                        truncated = true;
                        if let Some(node) = node.as_mut() {
                            node.truncated = true;
                        }
                    }
                    flat.add(product, line.unit, quantity, depth, owner.id)?;
                    if let (Some(node), Some(parent)) = (node, stack.last_mut()) {
                        parent.children.push(node);
                    }
                }
            }
        }

        Ok(Expansion {
            ingredients: flat.finish(request.precision),
            hierarchy,
            truncated,
            lines_visited,
            expanded_recipes,
        })
    }
}

/// Look up a line's product and its recipe once per calculation
fn resolve_product<'c, C>(
    catalog: &'c C,
    lookups: &mut HashMap<Uuid, ResolvedProduct<'c>>,
    line: &RecipeIngredient,
) -> Result<ResolvedProduct<'c>, CalculationError>
where
    C: CatalogReader + ?Sized,
{
    let product_id = line.ingredient_product_id;
    if let Some(resolved) = lookups.get(&product_id) {
        return Ok(*resolved);
    }
    let product = catalog
        .get_product(product_id)
        .ok_or(CalculationError::ProductNotFound { product_id })?;
    let recipe = if product.kind.is_expandable() {
        catalog.get_recipe_by_product(product_id)
    } else {
        None
    };
    lookups.insert(product_id, (product, recipe));
    Ok((product, recipe))
}

/// Products from the first occurrence of `repeated` on the stack, closed by `repeated`
fn cycle_path(stack: &[Frame<'_>], repeated: Uuid) -> Vec<Uuid> {
    let start = stack
        .iter()
        .position(|frame| frame.recipe.product_id == repeated)
        .unwrap_or(0);
    stack[start..]
        .iter()
        .map(|frame| frame.recipe.product_id)
        .chain(iter::once(repeated))
        .collect()
}

fn totals(
    ingredients: &[CalculatedIngredient],
    recipe_id: Uuid,
) -> Result<(Decimal, Decimal), CalculationError> {
    let overflow = || CalculationError::Overflow { recipe_id };
    ingredients
        .iter()
        .try_fold((Decimal::ZERO, Decimal::ZERO), |(weight, pieces), item| {
            match item.unit {
                Unit::Gram => Ok((
                    weight
                        .checked_add(item.calculated_quantity)
                        .ok_or_else(overflow)?,
                    pieces,
                )),
                Unit::Piece => Ok((
                    weight,
                    pieces
                        .checked_add(item.calculated_quantity)
                        .ok_or_else(overflow)?,
                )),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        cake_catalog, dec, id, CatalogBuilder, CAKE_RECIPE, FILLING, FLOUR, SUGAR,
    };
    use recipe_calc_core::models::ProductKind;

    fn cake_request(target: &str) -> CalculationRequest {
        CalculationRequest::new(id(CAKE_RECIPE), dec(target), Unit::Gram)
    }

    #[test]
    fn test_cake_scenario_flattens_and_sums_leaves() {
        let engine = ScalingEngine::default();
        let result = engine
            .calculate_request(&cake_catalog(), &cake_request("1000"))
            .unwrap();

        assert_eq!(result.scale_factor, dec("2"));
        assert_eq!(result.ingredients.len(), 2);
        assert_eq!(result.ingredient(id(FLOUR)).unwrap().calculated_quantity, dec("600"));
        assert_eq!(result.ingredient(id(SUGAR)).unwrap().calculated_quantity, dec("400"));
        assert_eq!(result.total_weight, dec("1000"));
        assert_eq!(result.total_pieces, Decimal::ZERO);
        assert!(!result.truncated);
        assert_eq!(result.metadata.expanded_recipes, 1);
        assert_eq!(result.metadata.ingredient_count, 5);
    }

    #[test]
    fn test_hierarchy_mirrors_expansion() {
        let engine = ScalingEngine::default();
        let result = engine
            .calculate_request(&cake_catalog(), &cake_request("1000"))
            .unwrap();
        let tree = result.hierarchy.unwrap();

        assert_eq!(tree.len(), 3);
        let filling = &tree[2];
        assert_eq!(filling.product_id, id(FILLING));
        assert!(filling.expanded);
        assert_eq!(filling.calculated_quantity, dec("300"));
        assert_eq!(filling.sub_ingredients.len(), 2);
        assert_eq!(filling.sub_ingredients[0].calculated_quantity, dec("200"));
        assert_eq!(filling.sub_ingredients[0].depth, 1);
        assert!(tree[0].sub_ingredients.is_empty());
    }

    #[test]
    fn test_hierarchy_omitted_when_not_requested() {
        let engine = ScalingEngine::default();
        let request = cake_request("1000").with_hierarchy(false);
        let result = engine.calculate_request(&cake_catalog(), &request).unwrap();
        assert!(result.hierarchy.is_none());
        assert_eq!(result.ingredient(id(FLOUR)).unwrap().calculated_quantity, dec("600"));
    }

    #[test]
    fn test_flat_depth_is_shallowest_appearance() {
        let engine = ScalingEngine::default();
        let result = engine
            .calculate_request(&cake_catalog(), &cake_request("500"))
            .unwrap();
        assert_eq!(result.ingredient(id(FLOUR)).unwrap().depth, 0);
        assert_eq!(result.ingredients[0].product_id, id(FLOUR));
        assert_eq!(result.ingredients[1].product_id, id(SUGAR));
    }

    #[test]
    fn test_scale_factor_is_exact() {
        let engine = ScalingEngine::default();
        for target in ["1", "333", "1000", "0.5", "12345.678"] {
            let result = engine
                .calculate_request(&cake_catalog(), &cake_request(target))
                .unwrap();
            assert_eq!(result.scale_factor, dec(target) / dec("500"));
        }
    }

    #[test]
    fn test_identity_scaling_preserves_leaf_quantities() {
        let catalog = CatalogBuilder::new()
            .product(1, "Salt", ProductKind::Standard, Unit::Gram)
            .product(2, "Egg", ProductKind::Standard, Unit::Piece)
            .product(3, "Dough", ProductKind::SemiProduct, Unit::Gram)
            .recipe(10, 3, "750", Unit::Gram, &[(1, "12.5", Unit::Gram), (2, "3", Unit::Piece)])
            .build();
        let engine = ScalingEngine::default();
        let request = CalculationRequest::new(id(10), dec("750"), Unit::Gram);
        let result = engine.calculate_request(&catalog, &request).unwrap();

        assert_eq!(result.scale_factor, Decimal::ONE);
        assert_eq!(result.ingredient(id(1)).unwrap().calculated_quantity, dec("12.5"));
        assert_eq!(result.ingredient(id(2)).unwrap().calculated_quantity, dec("3"));
        assert_eq!(result.total_pieces, dec("3"));
        assert_eq!(result.total_weight, dec("12.5"));
    }

    #[test]
    fn test_semi_product_used_twice_sums_contributions() {
        let catalog = CatalogBuilder::new()
            .product(1, "Flour", ProductKind::Standard, Unit::Gram)
            .product(2, "Cream", ProductKind::SemiProduct, Unit::Gram)
            .product(3, "Torte", ProductKind::SemiProduct, Unit::Gram)
            .recipe(20, 2, "100", Unit::Gram, &[(1, "50", Unit::Gram)])
            .recipe(
                30,
                3,
                "1000",
                Unit::Gram,
                &[(2, "100", Unit::Gram), (1, "10", Unit::Gram), (2, "300", Unit::Gram)],
            )
            .build();
        let engine = ScalingEngine::default();
        let request = CalculationRequest::new(id(30), dec("1000"), Unit::Gram);
        let result = engine.calculate_request(&catalog, &request).unwrap();

        // 50 + 10 + 150
        assert_eq!(result.ingredients.len(), 1);
        assert_eq!(result.ingredient(id(1)).unwrap().calculated_quantity, dec("210"));
        assert_eq!(result.metadata.expanded_recipes, 2);
    }

    #[test]
    fn test_max_depth_zero_truncates_without_expanding() {
        let catalog = CatalogBuilder::new()
            .product(1, "Flour", ProductKind::Standard, Unit::Gram)
            .product(2, "Base", ProductKind::SemiProduct, Unit::Gram)
            .product(3, "Kit", ProductKind::Kit, Unit::Piece)
            .product(4, "Box", ProductKind::Kit, Unit::Piece)
            .recipe(20, 2, "100", Unit::Gram, &[(1, "100", Unit::Gram)])
            .recipe(30, 3, "1", Unit::Piece, &[(1, "5", Unit::Gram)])
            .recipe(40, 4, "1", Unit::Piece, &[(2, "200", Unit::Gram), (3, "2", Unit::Piece)])
            .build();
        let engine = ScalingEngine::default();
        let request = CalculationRequest::new(id(40), dec("1"), Unit::Piece).with_max_depth(0);
        let result = engine.calculate_request(&catalog, &request).unwrap();

        assert!(result.truncated);
        assert_eq!(result.metadata.expanded_recipes, 0);
        assert_eq!(result.ingredients.len(), 2);
        assert!(result.ingredient(id(1)).is_none());
        let tree = result.hierarchy.unwrap();
        assert!(tree.iter().all(|node| node.truncated && !node.expanded));
    }

    #[test]
    fn test_expandable_without_recipe_is_a_leaf() {
        let catalog = CatalogBuilder::new()
            .product(1, "Topping", ProductKind::SemiProduct, Unit::Gram)
            .product(2, "Pie", ProductKind::SemiProduct, Unit::Gram)
            .recipe(20, 2, "100", Unit::Gram, &[(1, "40", Unit::Gram)])
            .build();
        let engine = ScalingEngine::default();
        let request = CalculationRequest::new(id(20), dec("200"), Unit::Gram);
        let result = engine.calculate_request(&catalog, &request).unwrap();

        assert!(!result.truncated);
        assert_eq!(result.ingredient(id(1)).unwrap().calculated_quantity, dec("80"));
    }

    #[test]
    fn test_target_unit_mismatch_is_rejected() {
        let engine = ScalingEngine::default();
        let request = CalculationRequest::new(id(CAKE_RECIPE), dec("2"), Unit::Piece);
        let error = engine.calculate_request(&cake_catalog(), &request).unwrap_err();
        assert!(matches!(
            error,
            CalculationError::UnitMismatch { expected: Unit::Gram, found: Unit::Piece, .. }
        ));
    }

    #[test]
    fn test_sub_recipe_unit_mismatch_names_sub_recipe() {
        let catalog = CatalogBuilder::new()
            .product(1, "Flour", ProductKind::Standard, Unit::Gram)
            .product(2, "Roll", ProductKind::SemiProduct, Unit::Piece)
            .product(3, "Basket", ProductKind::Kit, Unit::Piece)
            .recipe(20, 2, "10", Unit::Piece, &[(1, "500", Unit::Gram)])
            .recipe(30, 3, "1", Unit::Piece, &[(2, "250", Unit::Gram)])
            .build();
        let engine = ScalingEngine::default();
        let request = CalculationRequest::new(id(30), dec("1"), Unit::Piece);
        let error = engine.calculate_request(&catalog, &request).unwrap_err();
        assert_eq!(
            error,
            CalculationError::UnitMismatch {
                recipe_id: id(20),
                expected: Unit::Piece,
                found: Unit::Gram,
            }
        );
    }

    #[test]
    fn test_cycle_bypassing_validator_is_detected() {
        let catalog = CatalogBuilder::new()
            .product(1, "A", ProductKind::SemiProduct, Unit::Gram)
            .product(2, "B", ProductKind::SemiProduct, Unit::Gram)
            .recipe(10, 1, "100", Unit::Gram, &[(2, "100", Unit::Gram)])
            .recipe(20, 2, "100", Unit::Gram, &[(1, "100", Unit::Gram)])
            .build();
        let engine = ScalingEngine::default();
        let request = CalculationRequest::new(id(10), dec("100"), Unit::Gram);
        let error = engine.calculate_request(&catalog, &request).unwrap_err();
        assert_eq!(
            error,
            CalculationError::CycleDetected {
                path: vec![id(1), id(2), id(1)],
            }
        );
    }

    #[test]
    fn test_missing_recipe_and_product() {
        let engine = ScalingEngine::default();
        let request = CalculationRequest::new(id(999), dec("1"), Unit::Gram);
        assert_eq!(
            engine.calculate_request(&cake_catalog(), &request).unwrap_err(),
            CalculationError::RecipeNotFound { recipe_id: id(999) }
        );

        let catalog = CatalogBuilder::new()
            .product(2, "Pie", ProductKind::SemiProduct, Unit::Gram)
            .recipe(20, 2, "100", Unit::Gram, &[(77, "40", Unit::Gram)])
            .build();
        let request = CalculationRequest::new(id(20), dec("100"), Unit::Gram);
        assert_eq!(
            engine.calculate_request(&catalog, &request).unwrap_err(),
            CalculationError::ProductNotFound { product_id: id(77) }
        );
    }

    #[test]
    fn test_request_limits() {
        let engine = ScalingEngine::default();
        let zero = cake_request("0");
        assert!(matches!(
            engine.resolve(&zero),
            Err(CalculationError::InvalidQuantity { .. })
        ));
        let precise = cake_request("1").with_precision(7);
        assert_eq!(
            engine.resolve(&precise),
            Err(CalculationError::InvalidPrecision { requested: 7, max: 6 })
        );
        let deep = cake_request("1").with_max_depth(11);
        assert_eq!(
            engine.resolve(&deep),
            Err(CalculationError::MaxDepthExceeded { requested: 11, limit: 10 })
        );
        let resolved = engine.resolve(&cake_request("1")).unwrap();
        assert_eq!((resolved.max_depth, resolved.precision), (5, 3));
    }

    #[test]
    fn test_scale_bounds_and_ingredient_budget() {
        let engine = ScalingEngine::new(EngineConfig {
            max_scale_factor: Some(dec("10")),
            min_scale_factor: Some(dec("0.001")),
            ..EngineConfig::default()
        });
        assert!(matches!(
            engine.calculate_request(&cake_catalog(), &cake_request("5001")),
            Err(CalculationError::ScaleFactorOutOfRange { .. })
        ));
        assert!(engine
            .calculate_request(&cake_catalog(), &cake_request("5000"))
            .is_ok());

        let engine = ScalingEngine::new(EngineConfig {
            max_ingredients: 4,
            ..EngineConfig::default()
        });
        assert_eq!(
            engine.calculate_request(&cake_catalog(), &cake_request("500")),
            Err(CalculationError::TooManyIngredients { limit: 4 })
        );
    }

    #[test]
    fn test_default_scale_bounds() {
        let engine = ScalingEngine::default();
        let catalog = cake_catalog();

        // Cake yields 500 g: the default window is 0.5 g to 500 kg
        assert!(engine.calculate_request(&catalog, &cake_request("0.5")).is_ok());
        assert!(engine.calculate_request(&catalog, &cake_request("500000")).is_ok());
        assert!(matches!(
            engine.calculate_request(&catalog, &cake_request("0.4")),
            Err(CalculationError::ScaleFactorOutOfRange { .. })
        ));
        assert!(matches!(
            engine.calculate_request(&catalog, &cake_request("500001")),
            Err(CalculationError::ScaleFactorOutOfRange { .. })
        ));
    }

    #[test]
    fn test_rounding_applies_to_leaves_only() {
        let engine = ScalingEngine::default();
        let request = cake_request("1").with_precision(2);
        let result = engine.calculate_request(&cake_catalog(), &request).unwrap();

        // flour: 200/500 + 200 * (150/500) / 300 = 0.4 + 0.2
        assert_eq!(result.scale_factor, dec("0.002"));
        assert_eq!(result.ingredient(id(FLOUR)).unwrap().calculated_quantity, dec("0.6"));
        assert_eq!(result.ingredient(id(SUGAR)).unwrap().calculated_quantity, dec("0.4"));
    }

    #[test]
    fn test_repeated_calculations_serialize_identically() {
        let engine = ScalingEngine::default();
        let catalog = cake_catalog();
        let first = engine.calculate_request(&catalog, &cake_request("777")).unwrap();
        let second = engine.calculate_request(&catalog, &cake_request("777")).unwrap();
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }
}
