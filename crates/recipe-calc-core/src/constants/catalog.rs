// ABOUTME: Catalog write-path limits for recipe validation
// ABOUTME: Bounds applied when recipes are created or updated
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Maximum ingredient lines in a single recipe
pub const MAX_INGREDIENTS_PER_RECIPE: usize = 200;

/// Maximum length of a product or recipe name
pub const MAX_NAME_LENGTH: usize = 255;
