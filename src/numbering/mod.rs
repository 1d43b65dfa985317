//! First-seen-order numbering of cited entities.
//!
//! Each distinct [`ReferenceKey`] gets a stable integer, assigned in
//! strictly increasing order of first appearance in the text, gapless
//! from 1. Numbering never persists across independent texts.

use std::collections::HashMap;

use crate::token::{ReferenceKey, ReferenceToken};

/// Insertion-ordered map from [`ReferenceKey`] to citation number.
#[derive(Debug, Clone, Default)]
pub struct NumberingTable {
    numbers: HashMap<ReferenceKey, u32>,
    order: Vec<ReferenceKey>,
}

impl NumberingTable {
    /// Build the table from tokens in scan order. The first occurrence of
    /// a key is assigned `len + 1`; later occurrences reuse that number.
    pub fn from_tokens(tokens: &[ReferenceToken]) -> Self {
        let mut table = Self::default();
        for token in tokens {
            table.assign(token.key());
        }
        table
    }

    fn assign(&mut self, key: ReferenceKey) -> u32 {
        if let Some(&number) = self.numbers.get(&key) {
            return number;
        }
        let number = self.order.len() as u32 + 1;
        self.numbers.insert(key.clone(), number);
        self.order.push(key);
        number
    }

    pub fn number_of(&self, key: &ReferenceKey) -> Option<u32> {
        self.numbers.get(key).copied()
    }

    /// Whether `number` was assigned in this run. Numbers are gapless
    /// `1..=len`, so a range check suffices.
    pub fn contains_number(&self, number: u32) -> bool {
        number >= 1 && number as usize <= self.order.len()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate `(number, key)` pairs in ascending number order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &ReferenceKey)> {
        self.order
            .iter()
            .enumerate()
            .map(|(i, key)| (i as u32 + 1, key))
    }
}
