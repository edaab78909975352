use inkmath_shared::VarMap;

/// Name -> value bindings carried across recognition rounds. Only the merge
/// step writes here; the recognition client reads a copy at submit time.
#[derive(Default)]
pub struct VarStore {
    map: VarMap,
}

impl VarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &VarMap {
        &self.map
    }

    /// Inserts or silently overwrites; redefinition is intentional.
    pub fn apply_assignment(&mut self, name: &str, value: f64) {
        self.map.insert(name.to_string(), value);
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::VarStore;

    #[test]
    fn assignment_inserts_and_overwrites_latest_value() {
        let mut vars = VarStore::new();
        vars.apply_assignment("x", 5.0);
        vars.apply_assignment("y", 1.0);
        vars.apply_assignment("x", 7.0);
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get().get("x"), Some(&7.0));
        assert_eq!(vars.get().get("y"), Some(&1.0));
    }

    #[test]
    fn clear_empties_the_mapping_and_is_idempotent() {
        let mut vars = VarStore::new();
        vars.apply_assignment("x", 5.0);
        vars.clear();
        assert!(vars.is_empty());
        vars.clear();
        assert!(vars.is_empty());
        assert!(vars.get().get("x").is_none());
    }
}
