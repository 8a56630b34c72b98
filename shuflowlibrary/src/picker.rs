//! Random draws used by the selection reader

use crate::error::{LibraryError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

/// Thread-safe random source.
///
/// The lock is only taken for the duration of a single draw.
#[derive(Debug)]
pub struct Picker {
    rng: Mutex<StdRng>,
}

impl Default for Picker {
    fn default() -> Self {
        Self::new()
    }
}

impl Picker {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic source, for reproducible draws
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Uniform index in `0..len`, `None` when `len` is zero
    pub fn index(&self, len: u64) -> Option<u64> {
        if len == 0 {
            return None;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Some(rng.random_range(0..len))
    }

    /// Take one element uniformly at random
    pub fn choose<T>(&self, mut items: Vec<T>) -> Option<T> {
        let index = self.index(items.len() as u64)?;
        Some(items.swap_remove(index as usize))
    }

    /// Draw one key with probability proportional to its weight.
    ///
    /// Weights must be positive and `items` non-empty.
    pub fn weighted<T: Copy>(&self, items: &[(T, f64)]) -> Result<T> {
        let total: f64 = items.iter().map(|(_, w)| w).sum();
        let r = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            rng.random::<f64>() * total
        };
        select_weighted(items, r).ok_or_else(|| {
            LibraryError::InvariantViolation(format!(
                "weighted draw {r} fell outside the cumulative total {total}"
            ))
        })
    }
}

/// First key whose cumulative weight reaches `r`.
///
/// Ties go to the earlier key.
pub fn select_weighted<T: Copy>(items: &[(T, f64)], r: f64) -> Option<T> {
    let mut cumulative = 0.0;
    for (key, weight) in items {
        cumulative += weight;
        if cumulative >= r {
            return Some(*key);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Category;

    #[test]
    fn test_select_weighted_boundaries() {
        let items = [(Category::Albums, 1.0), (Category::Tracks, 3.0)];
        assert_eq!(select_weighted(&items, 0.0), Some(Category::Albums));
        assert_eq!(select_weighted(&items, 1.0), Some(Category::Albums));
        assert_eq!(select_weighted(&items, 1.0001), Some(Category::Tracks));
        assert_eq!(select_weighted(&items, 4.0), Some(Category::Tracks));
        assert_eq!(select_weighted(&items, 4.5), None);
    }

    #[test]
    fn test_weighted_draw_follows_weights() {
        let picker = Picker::seeded(7);
        let items = [(Category::Albums, 2.0), (Category::Tracks, 6.0)];
        let draws = 10_000;
        let albums = (0..draws)
            .filter(|_| picker.weighted(&items).unwrap() == Category::Albums)
            .count();
        let share = albums as f64 / draws as f64;
        assert!((0.20..=0.30).contains(&share), "albums share was {share}");
    }

    #[test]
    fn test_empty_draw_is_an_invariant_violation() {
        let picker = Picker::seeded(1);
        let items: [(Category, f64); 0] = [];
        assert!(matches!(
            picker.weighted(&items),
            Err(LibraryError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_index_and_choose() {
        let picker = Picker::seeded(3);
        assert_eq!(picker.index(0), None);
        assert_eq!(picker.index(1), Some(0));
        assert!(picker.choose(Vec::<u8>::new()).is_none());
        for _ in 0..100 {
            assert!(picker.index(5).unwrap() < 5);
        }
        assert_eq!(picker.choose(vec!["only"]), Some("only"));
    }
}
