// ABOUTME: Deterministic cache fingerprints for calculation requests
// ABOUTME: SHA-256 over a domain-separated, length-prefixed canonical encoding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Calculation Fingerprints
//!
//! A fingerprint identifies everything a result depends on: the root recipe and
//! its version, the target, the resolved options, the algorithm version, and a
//! digest of the reachable hierarchy. The digest covers the version of every
//! sub-recipe that can be expanded within `max_depth` and the identity, kind, unit
//! and name of every product referenced on the way, so editing a nested recipe or
//! reclassifying a product makes older cache entries unreachable.

use std::collections::HashMap;
use std::fmt;

use recipe_calc_core::constants::calculation::ALGORITHM_VERSION;
use recipe_calc_core::errors::CalculationError;
use recipe_calc_core::models::{CatalogReader, Product, Recipe};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::request::ResolvedRequest;

const DOMAIN: &[u8] = b"recipe-calc:fingerprint:";

/// 256-bit cache key of a calculation
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Wrap raw digest bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Fingerprint a resolved request against a catalog snapshot
    ///
    /// # Errors
    ///
    /// Returns `RecipeNotFound` if the root recipe is missing
    pub fn compute<C>(catalog: &C, request: &ResolvedRequest) -> Result<Self, CalculationError>
    where
        C: CatalogReader + ?Sized,
    {
        let recipe = catalog
            .get_recipe(request.recipe_id)
            .ok_or(CalculationError::RecipeNotFound {
                recipe_id: request.recipe_id,
            })?;

        let mut encoder = Encoder::new();
        encoder.bytes(ALGORITHM_VERSION.as_bytes());
        encoder.uuid(recipe.id);
        encoder.u64(recipe.version);
        encoder.bytes(request.target_quantity.to_string().as_bytes());
        encoder.bytes(request.target_unit.as_str().as_bytes());
        encoder.u64(u64::from(request.max_depth));
        encoder.u64(u64::from(request.precision));
        encoder.flag(request.include_hierarchy);
        if let Some(product) = catalog.get_product(recipe.product_id) {
            encoder.product(product);
        }
        encoder.dependencies(catalog, recipe, request.max_depth);

        Ok(Self(encoder.finish()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fingerprint({:02x}{:02x}{:02x}{:02x}…)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Length-prefixed field encoder feeding SHA-256
struct Encoder {
    hasher: Sha256,
}

impl Encoder {
    fn new() -> Self {
        let mut hasher = Sha256::new();
        hasher.update(DOMAIN);
        Self { hasher }
    }

    fn bytes(&mut self, data: &[u8]) {
        self.hasher.update((data.len() as u64).to_le_bytes());
        self.hasher.update(data);
    }

    fn uuid(&mut self, id: Uuid) {
        self.bytes(id.as_bytes());
    }

    fn u64(&mut self, value: u64) {
        self.bytes(&value.to_le_bytes());
    }

    fn flag(&mut self, value: bool) {
        self.bytes(&[u8::from(value)]);
    }

    fn product(&mut self, product: &Product) {
        self.uuid(product.id);
        self.bytes(product.kind.as_str().as_bytes());
        self.bytes(product.unit.as_str().as_bytes());
        self.bytes(product.name.as_bytes());
    }

    /// Walk the hierarchy the engine could expand and encode what it would read
    ///
    /// A sub-recipe reachable at several depths is re-walked only when reached
    /// with more remaining depth than before, which bounds the walk on shared
    /// sub-trees and terminates on cyclic data.
    fn dependencies<'c, C>(&mut self, catalog: &'c C, root: &'c Recipe, max_depth: u32)
    where
        C: CatalogReader + ?Sized,
    {
        let mut best_remaining: HashMap<Uuid, u32> = HashMap::from([(root.id, max_depth)]);
        let mut pending: Vec<(&'c Recipe, u32)> = vec![(root, max_depth)];

        while let Some((recipe, remaining)) = pending.pop() {
            self.uuid(recipe.id);
            self.u64(recipe.version);
            for line in recipe.ordered_ingredients() {
                let Some(product) = catalog.get_product(line.ingredient_product_id) else {
                    self.uuid(line.ingredient_product_id);
                    continue;
                };
                self.product(product);
                if remaining == 0 || !product.kind.is_expandable() {
                    continue;
                }
                let Some(sub) = catalog.get_recipe_by_product(product.id) else {
                    continue;
                };
                let next = remaining - 1;
                let seen = best_remaining.get(&sub.id).copied();
                if seen.map_or(true, |previous| next > previous) {
                    best_remaining.insert(sub.id, next);
                    pending.push((sub, next));
                }
            }
        }
    }

    fn finish(self) -> [u8; 32] {
        self.hasher.finalize().into()
    }
}
