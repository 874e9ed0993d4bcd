//! Set reconciliation for bulk membership/claim updates.

use std::collections::BTreeSet;

/// What must change to move from the held set to the desired set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<T> {
    pub to_remove: Vec<T>,
    pub to_add: Vec<T>,
}

impl<T> Reconciliation<T> {
    pub fn is_noop(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Only the difference is touched; entries in both sets are left alone.
pub fn reconcile<T: Ord + Clone>(held: &BTreeSet<T>, desired: &BTreeSet<T>) -> Reconciliation<T> {
    Reconciliation {
        to_remove: held.difference(desired).cloned().collect(),
        to_add: desired.difference(held).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn untouched_entries_are_not_churned() {
        let plan = reconcile(&set(&["Admin", "Staff"]), &set(&["Staff", "Payroll"]));
        assert_eq!(plan.to_remove, vec!["Admin".to_string()]);
        assert_eq!(plan.to_add, vec!["Payroll".to_string()]);
    }

    #[test]
    fn equal_sets_need_nothing() {
        assert!(reconcile(&set(&["Admin"]), &set(&["Admin"])).is_noop());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn applying_the_plan_yields_the_desired_set(
            held in proptest::collection::btree_set(0u8..16, 0..10),
            desired in proptest::collection::btree_set(0u8..16, 0..10),
        ) {
            let plan = reconcile(&held, &desired);
            let mut after = held.clone();
            for x in &plan.to_remove { after.remove(x); }
            for x in &plan.to_add { after.insert(*x); }
            prop_assert_eq!(&after, &desired);
            prop_assert!(reconcile(&after, &desired).is_noop());
        }
    }
}
