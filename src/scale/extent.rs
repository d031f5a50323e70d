//! Extent registry - what each perspective contributes to a scale.

use indexmap::IndexMap;

/// Composite registry key: which perspective, projecting which attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtentKey {
    pub perspective: String,
    pub attribute: String,
}

impl ExtentKey {
    pub fn new(perspective: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            perspective: perspective.into(),
            attribute: attribute.into(),
        }
    }
}

/// Insertion-ordered map from [`ExtentKey`] to a contributed extent.
#[derive(Debug, Clone)]
pub struct ExtentRegistry<E> {
    entries: IndexMap<ExtentKey, E>,
}

impl<E> Default for ExtentRegistry<E> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<E: Clone> ExtentRegistry<E> {
    /// Insert or replace the extent under `key`.
    pub fn update(&mut self, key: ExtentKey, extent: E) {
        self.entries.insert(key, extent);
    }

    pub fn remove(&mut self, key: &ExtentKey) -> Option<E> {
        self.entries.shift_remove(key)
    }

    pub fn get(&self, key: &ExtentKey) -> Option<&E> {
        self.entries.get(key)
    }

    /// All extents in contribution order.
    pub fn extents(&self) -> Vec<E> {
        self.entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_replaces_in_place() {
        let mut reg = ExtentRegistry::default();
        reg.update(ExtentKey::new("p1", "x"), [0.0, 1.0]);
        reg.update(ExtentKey::new("p2", "x"), [5.0, 6.0]);
        reg.update(ExtentKey::new("p1", "x"), [2.0, 3.0]);

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.extents(), vec![[2.0, 3.0], [5.0, 6.0]]);
    }

    #[test]
    fn test_attribute_is_part_of_key() {
        let mut reg = ExtentRegistry::default();
        reg.update(ExtentKey::new("p1", "x"), [0.0, 1.0]);
        reg.update(ExtentKey::new("p1", "y"), [0.0, 9.0]);
        assert_eq!(reg.len(), 2);

        assert_eq!(reg.remove(&ExtentKey::new("p1", "x")), Some([0.0, 1.0]));
        assert_eq!(reg.remove(&ExtentKey::new("p1", "x")), None);
        assert_eq!(reg.extents(), vec![[0.0, 9.0]]);
    }
}
