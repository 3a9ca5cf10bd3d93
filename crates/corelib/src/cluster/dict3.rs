//! The seven DICT3 operations, routed through [`Cluster::route`] to the
//! node that owns each row.

use super::Cluster;
use crate::error::{Error, Result};
use crate::hash::data_hash;
use crate::node::NodeId;
use crate::record::{DataKey, Permission, ValueRecord};
use chrono::{Duration, Local};
use std::collections::HashSet;
use tracing::debug;

/// A `(key, relationship, content)` triple as returned by `lookup`.
pub type Row = (String, String, String);

fn now() -> chrono::DateTime<Local> {
    Local::now()
}

/// `lookup(key, rel)`.
///
/// Exact lookup when both are given; a wildcard sweep over 16 (fixed key)
/// or 8 (fixed relationship) candidate owners when one is empty. See
/// [`crate::hash::data_hash`] for why those specific probe counts follow
/// from the hash layout.
pub fn lookup(cluster: &Cluster, key: &str, relationship: &str, from: NodeId) -> Result<Vec<Row>> {
    match (key.is_empty(), relationship.is_empty()) {
        (true, true) => Err(Error::KeyAndRelationshipEmpty),
        (false, false) => lookup_exact(cluster, key, relationship, from),
        (false, true) => Ok(lookup_wildcard_relationship(cluster, key, from)),
        (true, false) => Ok(lookup_wildcard_key(cluster, relationship, from)),
    }
}

fn lookup_exact(cluster: &Cluster, key: &str, relationship: &str, from: NodeId) -> Result<Vec<Row>> {
    let hash = data_hash(key, relationship);
    let owner = cluster.route(hash, from)?;
    let handle = cluster.data_handle(owner)?;
    let mut data = handle.lock();

    let dk = DataKey::new(key, relationship);
    let record = data.get_mut(&dk).ok_or(Error::NotFound)?;
    record.touch(now());
    Ok(vec![(key.to_string(), relationship.to_string(), record.content.clone())])
}

fn lookup_wildcard_relationship(cluster: &Cluster, key: &str, from: NodeId) -> Vec<Row> {
    let base = data_hash(key, "");
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for i in 0u16..16 {
        let hash = ((u16::from(base) + i) % 128) as crate::ring::Slot;
        let Ok(owner) = cluster.route(hash, from) else { continue };
        let Ok(handle) = cluster.data_handle(owner) else { continue };
        let mut data = handle.lock();
        for (k, v) in data.iter_mut() {
            if k.key == key && seen.insert((k.key.clone(), k.relationship.clone())) {
                v.touch(now());
                results.push((k.key.clone(), k.relationship.clone(), v.content.clone()));
            }
        }
    }
    results
}

fn lookup_wildcard_key(cluster: &Cluster, relationship: &str, from: NodeId) -> Vec<Row> {
    let base = data_hash("", relationship);
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for step in (0u16..128).step_by(16) {
        let hash = ((u16::from(base) + step) % 128) as crate::ring::Slot;
        let Ok(owner) = cluster.route(hash, from) else { continue };
        let Ok(handle) = cluster.data_handle(owner) else { continue };
        let mut data = handle.lock();
        for (k, v) in data.iter_mut() {
            if k.relationship == relationship && seen.insert((k.key.clone(), k.relationship.clone())) {
                v.touch(now());
                results.push((k.key.clone(), k.relationship.clone(), v.content.clone()));
            }
        }
    }
    results
}

/// `insert(key, rel, value, permission)`.
pub fn insert(
    cluster: &Cluster,
    key: &str,
    relationship: &str,
    content: &str,
    permission: Permission,
    from: NodeId,
) -> Result<()> {
    if key.is_empty() || relationship.is_empty() {
        return Err(Error::InputError);
    }
    let hash = data_hash(key, relationship);
    let owner = cluster.route(hash, from)?;
    let handle = cluster.data_handle(owner)?;
    let mut data = handle.lock();

    let dk = DataKey::new(key, relationship);
    if data.contains_key(&dk) {
        return Err(Error::AlreadyPresent);
    }
    debug!(node = owner.0, %key, %relationship, "inserting row");
    data.insert(dk, ValueRecord::new(content, permission, now()));
    Ok(())
}

/// `insertOrUpdate(key, rel, value, permission)`.
pub fn insert_or_update(
    cluster: &Cluster,
    key: &str,
    relationship: &str,
    content: &str,
    permission: Permission,
    from: NodeId,
) -> Result<()> {
    if key.is_empty() || relationship.is_empty() {
        return Err(Error::InputError);
    }
    let hash = data_hash(key, relationship);
    let owner = cluster.route(hash, from)?;
    let handle = cluster.data_handle(owner)?;
    let mut data = handle.lock();

    let dk = DataKey::new(key, relationship);
    match data.get_mut(&dk) {
        Some(existing) if existing.permission.is_writable() => {
            existing.update(content, permission, now());
            Ok(())
        }
        Some(_) => Err(Error::ReadOnly),
        None => {
            data.insert(dk, ValueRecord::new(content, permission, now()));
            Ok(())
        }
    }
}

/// `delete(key, rel)`.
pub fn delete(cluster: &Cluster, key: &str, relationship: &str, from: NodeId) -> Result<()> {
    if key.is_empty() || relationship.is_empty() {
        return Err(Error::InputError);
    }
    let hash = data_hash(key, relationship);
    let owner = cluster.route(hash, from)?;
    let handle = cluster.data_handle(owner)?;
    let mut data = handle.lock();

    let dk = DataKey::new(key, relationship);
    match data.get(&dk) {
        None => Err(Error::NotFound),
        Some(existing) if !existing.permission.is_writable() => Err(Error::ReadOnly),
        Some(_) => {
            data.remove(&dk);
            Ok(())
        }
    }
}

/// `listKeys()`: distinct `key` values across every node.
pub fn list_keys(cluster: &Cluster) -> Vec<String> {
    let mut keys: HashSet<String> = HashSet::new();
    for (_, handle) in cluster.all_data_handles() {
        for k in handle.lock().keys() {
            keys.insert(k.key.clone());
        }
    }
    let mut keys: Vec<String> = keys.into_iter().collect();
    keys.sort();
    keys
}

/// `listIDs()`: every live `(key, relationship)` pair across every node.
pub fn list_ids(cluster: &Cluster) -> Vec<(String, String)> {
    let mut ids = Vec::new();
    for (_, handle) in cluster.all_data_handles() {
        for k in handle.lock().keys() {
            ids.push((k.key.clone(), k.relationship.clone()));
        }
    }
    ids.sort();
    ids
}

/// `purge()`: removes rows whose `accessed` is older than `timeout`,
/// measured against `now_utc - 4h` rather than `now` directly.
///
/// The 4-hour skew is kept deliberately rather than silently dropped: it
/// means a row is purged `timeout` *after* the moment 4 hours before now,
/// i.e. roughly `4h + timeout` after it was last accessed.
pub fn purge(cluster: &Cluster, timeout: Duration) -> usize {
    let reference = now() - Duration::hours(4);
    let mut removed = 0;
    for (_, handle) in cluster.all_data_handles() {
        let mut data = handle.lock();
        let before = data.len();
        data.retain(|_, record| reference.signed_duration_since(record.accessed) < timeout);
        removed += before - data.len();
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;

    fn single_node() -> (Cluster, NodeId) {
        let cluster = Cluster::new();
        let node = NodeId(8000);
        cluster.join(node).unwrap();
        (cluster, node)
    }

    #[test]
    fn insert_then_lookup_round_trips() {
        let (cluster, node) = single_node();
        insert(&cluster, "a", "b", "v1", Permission::ReadWrite, node).unwrap();
        let rows = lookup(&cluster, "a", "b", node).unwrap();
        assert_eq!(rows, vec![("a".into(), "b".into(), "v1".into())]);
    }

    #[test]
    fn insert_twice_is_rejected() {
        let (cluster, node) = single_node();
        insert(&cluster, "a", "b", "v1", Permission::ReadWrite, node).unwrap();
        let err = insert(&cluster, "a", "b", "v2", Permission::ReadWrite, node).unwrap_err();
        assert!(matches!(err, Error::AlreadyPresent));
    }

    #[test]
    fn read_only_rows_reject_update_and_delete() {
        let (cluster, node) = single_node();
        insert(&cluster, "ro", "k", "x", Permission::ReadOnly, node).unwrap();
        assert!(matches!(
            delete(&cluster, "ro", "k", node).unwrap_err(),
            Error::ReadOnly
        ));
        assert!(matches!(
            insert_or_update(&cluster, "ro", "k", "y", Permission::ReadOnly, node).unwrap_err(),
            Error::ReadOnly
        ));
    }

    #[test]
    fn insert_or_update_is_idempotent_on_content() {
        let (cluster, node) = single_node();
        insert_or_update(&cluster, "a", "b", "v1", Permission::ReadWrite, node).unwrap();
        insert_or_update(&cluster, "a", "b", "v1", Permission::ReadWrite, node).unwrap();
        let rows = lookup(&cluster, "a", "b", node).unwrap();
        assert_eq!(rows, vec![("a".into(), "b".into(), "v1".into())]);
    }

    #[test]
    fn delete_twice_is_not_found_the_second_time() {
        let (cluster, node) = single_node();
        insert(&cluster, "a", "b", "v1", Permission::ReadWrite, node).unwrap();
        delete(&cluster, "a", "b", node).unwrap();
        assert!(matches!(delete(&cluster, "a", "b", node).unwrap_err(), Error::NotFound));
    }

    #[test]
    fn wildcard_relationship_lookup_finds_every_row_for_a_key_without_duplicates() {
        let (cluster, node) = single_node();
        insert(&cluster, "a", "r1", "v1", Permission::ReadWrite, node).unwrap();
        insert(&cluster, "a", "r2", "v2", Permission::ReadWrite, node).unwrap();
        insert(&cluster, "b", "r1", "v3", Permission::ReadWrite, node).unwrap();

        let mut rows = lookup(&cluster, "a", "", node).unwrap();
        rows.sort();
        assert_eq!(
            rows,
            vec![("a".into(), "r1".into(), "v1".into()), ("a".into(), "r2".into(), "v2".into())]
        );
    }

    #[test]
    fn wildcard_key_lookup_finds_every_row_for_a_relationship() {
        let (cluster, node) = single_node();
        insert(&cluster, "a", "r1", "v1", Permission::ReadWrite, node).unwrap();
        insert(&cluster, "a", "r2", "v2", Permission::ReadWrite, node).unwrap();
        insert(&cluster, "b", "r1", "v3", Permission::ReadWrite, node).unwrap();

        let mut rows = lookup(&cluster, "", "r1", node).unwrap();
        rows.sort();
        assert_eq!(
            rows,
            vec![("a".into(), "r1".into(), "v1".into()), ("b".into(), "r1".into(), "v3".into())]
        );
    }

    #[test]
    fn empty_key_and_relationship_is_an_input_error() {
        let (cluster, node) = single_node();
        assert!(matches!(
            lookup(&cluster, "", "", node).unwrap_err(),
            Error::KeyAndRelationshipEmpty
        ));
    }

    #[test]
    fn list_keys_and_list_ids_reflect_live_rows() {
        let (cluster, node) = single_node();
        insert(&cluster, "a", "r1", "v1", Permission::ReadWrite, node).unwrap();
        insert(&cluster, "a", "r2", "v2", Permission::ReadWrite, node).unwrap();
        insert(&cluster, "b", "r1", "v3", Permission::ReadWrite, node).unwrap();

        assert_eq!(list_keys(&cluster), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            list_ids(&cluster),
            vec![
                ("a".to_string(), "r1".to_string()),
                ("a".to_string(), "r2".to_string()),
                ("b".to_string(), "r1".to_string()),
            ]
        );
    }

    #[test]
    fn purge_removes_only_stale_rows() {
        let (cluster, node) = single_node();
        insert(&cluster, "fresh", "r", "v", Permission::ReadWrite, node).unwrap();

        // Manually age a second row's `accessed` far enough into the past
        // that it falls outside even the 4-hour skew plus a 60s timeout.
        insert(&cluster, "stale", "r", "v", Permission::ReadWrite, node).unwrap();
        {
            let handle = cluster.data_handle(node).unwrap();
            let mut data = handle.lock();
            let key = DataKey::new("stale", "r");
            let record = data.get_mut(&key).unwrap();
            record.accessed = now() - Duration::hours(5);
        }

        let removed_count = purge(&cluster, Duration::seconds(60));
        assert_eq!(removed_count, 1, "exactly one stale row should have been purged");
        assert_eq!(list_ids(&cluster), vec![("fresh".to_string(), "r".to_string())]);
    }
}
