//! Fruit kinds and the upcoming-fruit queue

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Fruit kinds, smallest to largest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FruitKind {
    Cherry,
    Strawberry,
    Grape,
    Dekopon,
    Persimmon,
    Apple,
    Pear,
    Peach,
    Pineapple,
    Melon,
    Watermelon,
}

impl FruitKind {
    pub const ALL: [FruitKind; 11] = [
        FruitKind::Cherry,
        FruitKind::Strawberry,
        FruitKind::Grape,
        FruitKind::Dekopon,
        FruitKind::Persimmon,
        FruitKind::Apple,
        FruitKind::Pear,
        FruitKind::Peach,
        FruitKind::Pineapple,
        FruitKind::Melon,
        FruitKind::Watermelon,
    ];

    /// Kinds that can come out of the dropper (larger ones only appear by merging)
    pub const DROPPABLE: [FruitKind; 5] = [
        FruitKind::Cherry,
        FruitKind::Strawberry,
        FruitKind::Grape,
        FruitKind::Dekopon,
        FruitKind::Persimmon,
    ];

    /// Position in the size order (0 = smallest)
    pub fn tier(self) -> usize {
        self as usize
    }

    /// Collision radius in world units
    pub fn radius(self) -> f32 {
        0.25 + 0.12 * self.tier() as f32
    }
}

/// Chooses the kind appended to the queue after each release
pub trait KindPicker {
    fn pick(&mut self) -> FruitKind;
}

/// Uniform choice over a fixed kind set, seeded for reproducible runs
#[derive(Debug, Clone)]
pub struct UniformPicker {
    kinds: Vec<FruitKind>,
    rng: Pcg32,
}

impl UniformPicker {
    /// An empty kind set falls back to every droppable kind
    pub fn new(kinds: &[FruitKind], seed: u64) -> Self {
        let kinds = if kinds.is_empty() {
            FruitKind::DROPPABLE.to_vec()
        } else {
            kinds.to_vec()
        };
        Self {
            kinds,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn kinds(&self) -> &[FruitKind] {
        &self.kinds
    }
}

impl KindPicker for UniformPicker {
    fn pick(&mut self) -> FruitKind {
        let idx = self.rng.random_range(0..self.kinds.len());
        self.kinds[idx]
    }
}

/// Upcoming fruits; the front is always the next kind to spawn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FruitQueue {
    kinds: VecDeque<FruitKind>,
}

impl FruitQueue {
    /// Queue of `len` freshly picked kinds
    pub fn filled(len: usize, picker: &mut impl KindPicker) -> Self {
        Self {
            kinds: (0..len).map(|_| picker.pick()).collect(),
        }
    }

    pub fn from_kinds(kinds: impl IntoIterator<Item = FruitKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn front(&self) -> Option<FruitKind> {
        self.kinds.front().copied()
    }

    pub fn get(&self, index: usize) -> Option<FruitKind> {
        self.kinds.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = FruitKind> + '_ {
        self.kinds.iter().copied()
    }

    /// Consume the front kind and append one new pick.
    /// Returns the consumed kind, or `None` (queue untouched) when empty.
    pub fn advance(&mut self, picker: &mut impl KindPicker) -> Option<FruitKind> {
        let consumed = self.kinds.pop_front()?;
        self.kinds.push_back(picker.pick());
        Some(consumed)
    }
}
