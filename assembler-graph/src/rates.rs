//! Per-item rate totals with keyed addition

use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::Add;

/// Map from item to a rate (items per second, or items per unit crafted).
///
/// Addition merges keys and adds values. It is associative and commutative
/// with the empty map as identity, so totals can be combined in any order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateMap(BTreeMap<String, f64>);

impl RateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(item: &str, rate: f64) -> Self {
        let mut map = BTreeMap::new();
        map.insert(item.to_string(), rate);
        RateMap(map)
    }

    pub fn get(&self, item: &str) -> Option<f64> {
        self.0.get(item).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in item order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(item, rate)| (item.as_str(), *rate))
    }

    /// Every value multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> RateMap {
        RateMap(
            self.0
                .iter()
                .map(|(item, rate)| (item.clone(), rate * factor))
                .collect(),
        )
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    fn accumulate(&mut self, item: &str, rate: f64) {
        *self.0.entry(item.to_string()).or_default() += rate;
    }
}

impl Add for RateMap {
    type Output = RateMap;

    fn add(mut self, rhs: RateMap) -> RateMap {
        for (item, rate) in rhs.0 {
            *self.0.entry(item).or_default() += rate;
        }
        self
    }
}

impl Add<&RateMap> for &RateMap {
    type Output = RateMap;

    fn add(self, rhs: &RateMap) -> RateMap {
        self.clone() + rhs.clone()
    }
}

impl Sum for RateMap {
    fn sum<I: Iterator<Item = RateMap>>(iter: I) -> Self {
        iter.fold(RateMap::new(), |acc, map| acc + map)
    }
}

/// Duplicate keys are added together rather than overwritten.
impl<S: AsRef<str>> FromIterator<(S, f64)> for RateMap {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut map = RateMap::new();
        for (item, rate) in iter {
            map.accumulate(item.as_ref(), rate);
        }
        map
    }
}

impl std::fmt::Display for RateMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (item, rate)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", item, rate)?;
        }
        write!(f, "}}")
    }
}
