// ABOUTME: Arena dependency graph over products with write-time cycle validation
// ABOUTME: Also provides where-used lookups and a parallel whole-catalog audit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Dependency Graph
//!
//! Products are nodes; an edge `P -> Q` exists when the recipe producing `P` has an
//! ingredient line referencing `Q`. The graph is an arena of product ids with
//! adjacency lists of arena indices, rebuilt from a catalog snapshot on demand.
//!
//! Write-time validation does not build the arena. It walks outward from the
//! candidate's proposed ingredients, resolving each product's recipe through the
//! catalog on demand, so only products reachable from the candidate are touched.

use std::collections::{BTreeMap, HashMap, HashSet};

use rayon::prelude::*;
use recipe_calc_core::errors::CatalogError;
use recipe_calc_core::models::{CatalogReader, Recipe, RecipeDraft};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

/// Product dependency graph
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Uuid>,
    index: HashMap<Uuid, usize>,
    edges: Vec<Vec<usize>>,
}

/// A cycle found by [`DependencyGraph::audit`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Smallest product id on the cycle, used as its canonical start
    pub product_id: Uuid,
    /// Product ids along the cycle, first and last equal
    pub path: Vec<Uuid>,
}

impl DependencyGraph {
    /// Build the graph from every recipe in the catalog
    pub fn from_catalog<C>(catalog: &C) -> Self
    where
        C: CatalogReader + ?Sized,
    {
        let mut graph = Self::default();
        for recipe in catalog.recipes() {
            graph.add_edges(recipe.product_id, recipe.ingredient_product_ids());
        }
        graph
    }

    fn node(&mut self, product_id: Uuid) -> usize {
        if let Some(&position) = self.index.get(&product_id) {
            return position;
        }
        let position = self.nodes.len();
        self.nodes.push(product_id);
        self.edges.push(Vec::new());
        self.index.insert(product_id, position);
        position
    }

    fn add_edges<I>(&mut self, from: Uuid, targets: I)
    where
        I: IntoIterator<Item = Uuid>,
    {
        let source = self.node(from);
        let mut seen = HashSet::new();
        for target in targets {
            let target = self.node(target);
            if seen.insert(target) {
                self.edges[source].push(target);
            }
        }
    }

    /// Number of products in the graph
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct product-to-ingredient edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    /// Path from `start` back to itself, if one exists
    ///
    /// Iterative depth-first search; the explicit stack doubles as the reported path.
    #[must_use]
    pub fn find_cycle_from(&self, start: Uuid) -> Option<Vec<Uuid>> {
        let &origin = self.index.get(&start)?;
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(usize, usize)> = vec![(origin, 0)];
        visited[origin] = true;

        while let Some((node, next_child)) = stack.last_mut() {
            let Some(&child) = self.edges[*node].get(*next_child) else {
                stack.pop();
                continue;
            };
            *next_child += 1;

            if child == origin {
                let mut path: Vec<Uuid> = stack.iter().map(|(n, _)| self.nodes[*n]).collect();
                path.push(start);
                return Some(path);
            }
            if !visited[child] {
                visited[child] = true;
                stack.push((child, 0));
            }
        }
        None
    }

    /// Products whose recipes list `product_id` directly as an ingredient
    #[must_use]
    pub fn dependents(&self, product_id: Uuid) -> Vec<Uuid> {
        let Some(&target) = self.index.get(&product_id) else {
            return Vec::new();
        };
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, children)| children.contains(&target))
            .map(|(source, _)| self.nodes[source])
            .collect()
    }

    /// Every distinct cycle in the graph, checked in parallel
    #[must_use]
    pub fn audit(&self) -> Vec<CycleReport> {
        let found: Vec<Vec<Uuid>> = self
            .nodes
            .par_iter()
            .filter_map(|&product_id| self.find_cycle_from(product_id))
            .collect();

        let mut unique: BTreeMap<Vec<Uuid>, CycleReport> = BTreeMap::new();
        for path in found {
            let canonical = canonical_cycle(&path);
            unique.entry(canonical.clone()).or_insert_with(|| {
                let mut closed = canonical.clone();
                closed.push(canonical[0]);
                CycleReport {
                    product_id: canonical[0],
                    path: closed,
                }
            });
        }
        let reports: Vec<CycleReport> = unique.into_values().collect();
        if !reports.is_empty() {
            warn!(cycles = reports.len(), "Catalog audit found circular dependencies");
        }
        reports
    }
}

/// Rotate an open cycle so it starts at its smallest id
fn canonical_cycle(path: &[Uuid]) -> Vec<Uuid> {
    let open = &path[..path.len().saturating_sub(1)];
    let start = open
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map_or(0, |(position, _)| position);
    open[start..].iter().chain(&open[..start]).copied().collect()
}

/// Search for a path from `product_id` back to itself with its edges replaced by `ingredients`
///
/// Successors of every other product come from its recipe in `catalog`. Each
/// reachable product is expanded at most once.
fn find_proposed_cycle<C, I>(catalog: &C, product_id: Uuid, ingredients: I) -> Option<Vec<Uuid>>
where
    C: CatalogReader + ?Sized,
    I: IntoIterator<Item = Uuid>,
{
    let successors = |node: Uuid| -> Vec<Uuid> {
        catalog
            .get_recipe_by_product(node)
            .map(|recipe| dedup_ids(recipe.ingredient_product_ids()))
            .unwrap_or_default()
    };

    let mut visited: HashSet<Uuid> = HashSet::from([product_id]);
    let mut stack: Vec<(Uuid, Vec<Uuid>, usize)> = vec![(product_id, dedup_ids(ingredients), 0)];

    while let Some((_, children, next_child)) = stack.last_mut() {
        let Some(&child) = children.get(*next_child) else {
            stack.pop();
            continue;
        };
        *next_child += 1;

        if child == product_id {
            let mut path: Vec<Uuid> = stack.iter().map(|(node, _, _)| *node).collect();
            path.push(product_id);
            return Some(path);
        }
        if visited.insert(child) {
            stack.push((child, successors(child), 0));
        }
    }
    None
}

/// Ids in first-appearance order without repeats
fn dedup_ids<I>(ids: I) -> Vec<Uuid>
where
    I: IntoIterator<Item = Uuid>,
{
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn check_proposed_edges<C, I>(catalog: &C, product_id: Uuid, ingredients: I) -> Result<(), CatalogError>
where
    C: CatalogReader + ?Sized,
    I: IntoIterator<Item = Uuid>,
{
    match find_proposed_cycle(catalog, product_id, ingredients) {
        Some(path) => Err(CatalogError::CycleDetected { path }),
        None => Ok(()),
    }
}

/// Reject a recipe whose ingredients would transitively reach its own output product
///
/// # Errors
///
/// Returns `CycleDetected` with the offending path
pub fn validate<C>(candidate: &Recipe, catalog: &C) -> Result<(), CatalogError>
where
    C: CatalogReader + ?Sized,
{
    check_proposed_edges(
        catalog,
        candidate.product_id,
        candidate.ingredient_product_ids(),
    )
}

/// Same check as [`validate`] for a recipe that has not been assigned an id yet
///
/// # Errors
///
/// Returns `CycleDetected` with the offending path
pub fn validate_draft<C>(draft: &RecipeDraft, catalog: &C) -> Result<(), CatalogError>
where
    C: CatalogReader + ?Sized,
{
    check_proposed_edges(
        catalog,
        draft.product_id,
        draft
            .ingredients
            .iter()
            .map(|line| line.ingredient_product_id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cake_catalog, id, CatalogBuilder, CAKE, FILLING, FLOUR};
    use recipe_calc_core::models::{CatalogSnapshot, Product, ProductKind, RecipeIngredient, Unit};
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Catalog wrapper counting recipe lookups and full scans
    struct CountingCatalog {
        inner: CatalogSnapshot,
        lookups: AtomicUsize,
        scans: AtomicUsize,
    }

    impl CatalogReader for CountingCatalog {
        fn get_product(&self, product_id: Uuid) -> Option<&Product> {
            self.inner.get_product(product_id)
        }

        fn get_recipe(&self, recipe_id: Uuid) -> Option<&Recipe> {
            self.inner.get_recipe(recipe_id)
        }

        fn get_recipe_by_product(&self, product_id: Uuid) -> Option<&Recipe> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.get_recipe_by_product(product_id)
        }

        fn recipes(&self) -> Box<dyn Iterator<Item = &Recipe> + '_> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            self.inner.recipes()
        }
    }

    fn draft(product: u128, ingredients: &[u128]) -> RecipeDraft {
        RecipeDraft {
            id: None,
            product_id: id(product),
            name: "candidate".to_owned(),
            yield_quantity: Decimal::ONE_HUNDRED,
            yield_unit: Unit::Gram,
            ingredients: ingredients
                .iter()
                .zip(0_u32..)
                .map(|(product, order)| RecipeIngredient {
                    ingredient_product_id: id(*product),
                    quantity: Decimal::TEN,
                    unit: Unit::Gram,
                    order,
                })
                .collect(),
        }
    }

    fn chain() -> CatalogBuilder {
        CatalogBuilder::new()
            .product(1, "A", ProductKind::SemiProduct, Unit::Gram)
            .product(2, "B", ProductKind::SemiProduct, Unit::Gram)
            .product(3, "C", ProductKind::SemiProduct, Unit::Gram)
            .product(9, "Salt", ProductKind::Standard, Unit::Gram)
    }

    #[test]
    fn test_self_reference_is_rejected() {
        let catalog = chain().build();
        let error = validate_draft(&draft(1, &[9, 1]), &catalog).unwrap_err();
        assert_eq!(error, CatalogError::CycleDetected { path: vec![id(1), id(1)] });
    }

    #[test]
    fn test_two_step_cycle_reports_path() {
        let catalog = chain()
            .recipe(20, 2, "100", Unit::Gram, &[(1, "10", Unit::Gram)])
            .build();
        let error = validate_draft(&draft(1, &[2]), &catalog).unwrap_err();
        assert_eq!(error, CatalogError::CycleDetected { path: vec![id(1), id(2), id(1)] });
    }

    #[test]
    fn test_transitive_cycle_reports_full_path() {
        let catalog = chain()
            .recipe(10, 1, "100", Unit::Gram, &[(2, "10", Unit::Gram)])
            .recipe(20, 2, "100", Unit::Gram, &[(3, "10", Unit::Gram)])
            .build();
        let error = validate_draft(&draft(3, &[9, 1]), &catalog).unwrap_err();
        assert_eq!(
            error,
            CatalogError::CycleDetected { path: vec![id(3), id(1), id(2), id(3)] }
        );
    }

    #[test]
    fn test_replacing_edges_can_remove_a_cycle() {
        // A -> B exists; B -> A would close a cycle, but A's update to drop B is fine.
        let catalog = chain()
            .recipe(10, 1, "100", Unit::Gram, &[(2, "10", Unit::Gram)])
            .recipe(20, 2, "100", Unit::Gram, &[(9, "10", Unit::Gram)])
            .build();
        assert!(validate_draft(&draft(1, &[9]), &catalog).is_ok());
        assert!(validate_draft(&draft(2, &[1]), &catalog).is_err());
    }

    #[test]
    fn test_existing_recipes_validate() {
        let catalog = cake_catalog();
        for recipe in catalog.recipes() {
            assert!(validate(recipe, &catalog).is_ok());
        }
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let catalog = chain()
            .recipe(20, 2, "100", Unit::Gram, &[(3, "10", Unit::Gram)])
            .recipe(30, 3, "100", Unit::Gram, &[(9, "10", Unit::Gram)])
            .build();
        assert!(validate_draft(&draft(1, &[2, 3, 9]), &catalog).is_ok());
    }

    #[test]
    fn test_dependents_lists_direct_users() {
        let graph = DependencyGraph::from_catalog(&cake_catalog());
        let mut users = graph.dependents(id(FLOUR));
        users.sort();
        assert_eq!(users, vec![id(FILLING), id(CAKE)]);
        assert_eq!(graph.dependents(id(CAKE)), Vec::<Uuid>::new());
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn test_audit_reports_each_cycle_once() {
        let catalog = chain()
            .recipe(10, 1, "100", Unit::Gram, &[(2, "10", Unit::Gram)])
            .recipe(20, 2, "100", Unit::Gram, &[(3, "10", Unit::Gram)])
            .recipe(30, 3, "100", Unit::Gram, &[(1, "10", Unit::Gram)])
            .build();
        let reports = DependencyGraph::from_catalog(&catalog).audit();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].product_id, id(1));
        assert_eq!(reports[0].path, vec![id(1), id(2), id(3), id(1)]);

        assert!(DependencyGraph::from_catalog(&cake_catalog()).audit().is_empty());
    }

    #[test]
    fn test_validation_only_visits_reachable_products() {
        // 500 unrelated two-level recipes next to a small chain A -> B -> Salt
        let mut builder = chain()
            .recipe(10, 1, "100", Unit::Gram, &[(2, "10", Unit::Gram)])
            .recipe(20, 2, "100", Unit::Gram, &[(9, "10", Unit::Gram)]);
        for n in 0..500_u128 {
            let product = 1_000 + n;
            builder = builder
                .product(product, "Unrelated", ProductKind::SemiProduct, Unit::Gram)
                .recipe(10_000 + n, product, "100", Unit::Gram, &[(9, "10", Unit::Gram)]);
        }
        let catalog = CountingCatalog {
            inner: builder.build(),
            lookups: AtomicUsize::new(0),
            scans: AtomicUsize::new(0),
        };

        assert!(validate_draft(&draft(3, &[1, 9]), &catalog).is_ok());

        // A, B and Salt are resolved once each; nothing else is touched
        assert_eq!(catalog.lookups.load(Ordering::SeqCst), 3);
        assert_eq!(catalog.scans.load(Ordering::SeqCst), 0);
    }
}
