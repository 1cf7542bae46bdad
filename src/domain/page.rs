use serde::Serialize;

/// One page of remote records with the backend's totals.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Page built from a response without a pagination block.
    pub fn single(items: Vec<T>) -> Self {
        let total = items.len();
        Self {
            items,
            total,
            total_pages: 1,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            total_pages: 0,
        }
    }
}
