//! Row matching by key

use crate::model::{KeyIndex, RowKey};

/// Keys of two tables split into old-only, new-only and shared
#[derive(Debug)]
pub struct KeyPartition<'a> {
    /// Old-only keys with their old row position, in old order
    pub removed: Vec<(&'a RowKey, usize)>,
    /// New-only keys with their new row position, in new order
    pub added: Vec<(&'a RowKey, usize)>,
    /// Shared keys with (old, new) row positions, in old order
    pub common: Vec<(&'a RowKey, usize, usize)>,
}

/// Partition two key indexes by set difference and intersection
/// over whole key tuples.
pub fn partition_keys<'a>(old: &'a KeyIndex, new: &'a KeyIndex) -> KeyPartition<'a> {
    let mut removed = Vec::new();
    let mut common = Vec::new();

    for (key, old_idx) in old.iter() {
        match new.get(key) {
            Some(new_idx) => common.push((key, old_idx, new_idx)),
            None => removed.push((key, old_idx)),
        }
    }

    let added = new.iter().filter(|(key, _)| !old.contains(key)).collect();

    KeyPartition {
        removed,
        added,
        common,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableSide;
    use crate::model::Table;

    #[test]
    fn test_partition_composite_keys_as_tuples() {
        let key = vec!["region".to_string(), "product".to_string()];
        let old = Table::with_headers(&["region", "product"])
            .push(vec!["US".into(), "Widget".into()])
            .push(vec!["EU".into(), "Gadget".into()]);
        let new = Table::with_headers(&["product", "region"])
            .push(vec!["Widget".into(), "EU".into()])
            .push(vec!["Gadget".into(), "EU".into()]);

        let old_index = KeyIndex::build(&old, &key, TableSide::Old).unwrap();
        let new_index = KeyIndex::build(&new, &key, TableSide::New).unwrap();
        let partition = partition_keys(&old_index, &new_index);

        // Every component value exists on both sides, only the tuples differ
        assert_eq!(partition.removed.len(), 1);
        assert_eq!(partition.removed[0].0.to_string(), "(US, Widget)");
        assert_eq!(partition.added.len(), 1);
        assert_eq!(partition.added[0].0.to_string(), "(EU, Widget)");
        assert_eq!(partition.common.len(), 1);
        assert_eq!(partition.common[0].1, 1);
        assert_eq!(partition.common[0].2, 1);
    }
}
