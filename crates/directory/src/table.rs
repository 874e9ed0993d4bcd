use std::collections::HashMap;

use staffdesk_core::Entity;

/// In-memory keyed collection of entities.
///
/// Not synchronized on its own; owners wrap it in a lock together with any
/// related state so that multi-table checks happen under one guard.
#[derive(Debug)]
pub struct Table<E: Entity> {
    rows: HashMap<E::Id, E>,
}

impl<E: Entity> Default for Table<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Table<E> {
    pub fn new() -> Self {
        Self { rows: HashMap::new() }
    }

    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.rows.get(id)
    }

    pub fn contains(&self, id: &E::Id) -> bool {
        self.rows.contains_key(id)
    }

    pub fn upsert(&mut self, entity: E) {
        self.rows.insert(entity.id(), entity);
    }

    pub fn remove(&mut self, id: &E::Id) -> Option<E> {
        self.rows.remove(id)
    }

    pub fn find(&self, mut pred: impl FnMut(&E) -> bool) -> Option<&E> {
        self.rows.values().find(|e| pred(*e))
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    #[test]
    fn upsert_replaces_by_id() {
        let mut table: Table<Role> = Table::new();
        let mut role = Role::new("Manager");
        table.upsert(role.clone());

        role.name = "Lead".to_string();
        table.upsert(role.clone());

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&role.id).unwrap().name, "Lead");
    }

    #[test]
    fn find_and_remove() {
        let mut table: Table<Role> = Table::new();
        let role = Role::new("Manager");
        table.upsert(role.clone());

        assert!(table.find(|r| r.name == "Manager").is_some());
        assert_eq!(table.remove(&role.id), Some(role));
        assert!(table.is_empty());
    }
}
