use std::collections::HashSet;

use super::product::Product;

/// Product urls known as of the last successful poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    known: HashSet<String>,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_products(products: &[Product]) -> Self {
        Self {
            known: products.iter().map(|p| p.url.clone()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.known.contains(url)
    }

    /// Products whose url is not yet known, in the order they were given.
    pub fn new_products(&self, current: &[Product]) -> Vec<Product> {
        current
            .iter()
            .filter(|p| !self.known.contains(&p.url))
            .cloned()
            .collect()
    }
}
