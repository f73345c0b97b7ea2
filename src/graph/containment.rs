//! Containment manager
//!
//! Keeps the store and the parent back-reference in step: a node is held by at most
//! one containment slot, and its parent points at exactly that slot. Every install
//! first detaches the node from wherever it currently is, firing the Deleted event
//! against the old owner, then sets the parent, then installs.
//!
//! These functions assume the caller has already validated the values.

use super::store::Slot;
use super::table::{ContainmentSlot, NodeTable};
use super::value::{NodeId, Value};
use crate::notification::ChangeEvent;

/// Removes `child` from its current containment slot, if any.
///
/// A single slot is cleared to absent; a sequence loses the child at its position.
pub fn detach(
    table: &mut NodeTable,
    child: NodeId,
    events: &mut Vec<ChangeEvent>,
) -> Option<ContainmentSlot> {
    let slot = table.get_mut(child)?.parent.take()?;
    let owner = table.get_mut(slot.parent)?;

    let is_sequence = matches!(owner.store.get(&slot.feature), Some(Slot::Many(_)));
    let index = if is_sequence {
        let index = owner.store.position_of(&slot.feature, &Value::Node(child));
        if let Some(i) = index {
            owner.store.remove_at(&slot.feature, i);
        }
        index
    } else {
        owner.store.clear(&slot.feature);
        None
    };

    events.push(ChangeEvent::child_deleted(slot.parent, &slot.feature, index, child));
    Some(slot)
}

/// Installs `child` into a single containment slot of `parent`.
///
/// Returns the child that was displaced; its parent is cleared.
pub fn attach_single(
    table: &mut NodeTable,
    parent: NodeId,
    feature: &str,
    child: NodeId,
    events: &mut Vec<ChangeEvent>,
) -> Option<NodeId> {
    detach(table, child, events);

    let displaced = table
        .get_mut(parent)?
        .store
        .replace_single(feature, Value::Node(child))
        .and_then(|old| old.as_node());
    set_parent(table, child, parent, feature);

    match displaced {
        Some(old_child) => {
            if let Some(record) = table.get_mut(old_child) {
                record.parent = None;
            }
            events.push(ChangeEvent::child_replaced(parent, feature, old_child, child));
        }
        None => events.push(ChangeEvent::child_added(parent, feature, None, child)),
    }
    displaced
}

/// Inserts `child` into a containment sequence of `parent` at `index`.
///
/// When the child already sits earlier in the same sequence, its removal shifts the
/// target position down by one. Returns the position the child ends up at.
pub fn attach_at(
    table: &mut NodeTable,
    parent: NodeId,
    feature: &str,
    index: usize,
    child: NodeId,
    events: &mut Vec<ChangeEvent>,
) -> usize {
    let mut index = index;
    let same_slot = table
        .get(child)
        .and_then(|r| r.parent.as_ref())
        .map(|slot| slot.parent == parent && slot.feature == feature)
        .unwrap_or(false);
    if same_slot {
        let position = table
            .get(parent)
            .and_then(|r| r.store.position_of(feature, &Value::Node(child)));
        if matches!(position, Some(p) if p < index) {
            index -= 1;
        }
    }

    detach(table, child, events);

    if let Some(record) = table.get_mut(parent) {
        record.store.insert_at(feature, index, Value::Node(child));
    }
    set_parent(table, child, parent, feature);
    events.push(ChangeEvent::child_added(parent, feature, Some(index), child));
    index
}

/// Clears the parent of a child that has already been taken out of its slot
pub fn release(table: &mut NodeTable, child: NodeId) {
    if let Some(record) = table.get_mut(child) {
        record.parent = None;
    }
}

pub fn set_parent(table: &mut NodeTable, child: NodeId, parent: NodeId, feature: &str) {
    if let Some(record) = table.get_mut(child) {
        record.parent = Some(ContainmentSlot {
            parent,
            feature: feature.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::EventKind;

    fn table() -> (NodeTable, NodeId, NodeId, NodeId) {
        let mut table = NodeTable::new();
        let p1 = table.insert("p1".into(), "Box".into());
        let p2 = table.insert("p2".into(), "Box".into());
        let c = table.insert("c".into(), "Doc".into());
        (table, p1, p2, c)
    }

    #[test]
    fn test_attach_single_moves_between_parents() {
        let (mut table, p1, p2, c) = table();
        let mut events = Vec::new();

        attach_single(&mut table, p1, "doc", c, &mut events);
        assert_eq!(table.parent_of(c), Some(p1));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::ChildAdded);

        events.clear();
        attach_single(&mut table, p2, "doc", c, &mut events);
        assert_eq!(table.parent_of(c), Some(p2));
        assert_eq!(table.get(p1).unwrap().store.single("doc"), None);
        let kinds: Vec<_> = events.iter().map(|e| (e.kind, e.node)).collect();
        assert_eq!(
            kinds,
            vec![(EventKind::ChildDeleted, p1), (EventKind::ChildAdded, p2)]
        );
    }

    #[test]
    fn test_attach_single_displaces_previous_child() {
        let (mut table, p1, _, c) = table();
        let d = table.insert("d".into(), "Doc".into());
        let mut events = Vec::new();

        attach_single(&mut table, p1, "doc", c, &mut events);
        events.clear();
        let displaced = attach_single(&mut table, p1, "doc", d, &mut events);

        assert_eq!(displaced, Some(c));
        assert_eq!(table.parent_of(c), None);
        assert_eq!(table.parent_of(d), Some(p1));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::ChildReplaced);
        assert_eq!(events[0].old_value, Some(Value::Node(c)));
        assert_eq!(events[0].new_value, Some(Value::Node(d)));
    }

    #[test]
    fn test_attach_at_reorders_within_same_sequence() {
        let (mut table, p1, _, c) = table();
        let d = table.insert("d".into(), "Doc".into());
        let e = table.insert("e".into(), "Doc".into());
        let mut events = Vec::new();
        for (i, child) in [c, d, e].into_iter().enumerate() {
            attach_at(&mut table, p1, "kids", i, child, &mut events);
        }

        // move c to the end: removal shifts the target down
        events.clear();
        let placed = attach_at(&mut table, p1, "kids", 3, c, &mut events);
        assert_eq!(placed, 2);
        assert_eq!(
            table.get(p1).unwrap().store.many("kids"),
            &[Value::Node(d), Value::Node(e), Value::Node(c)]
        );
        assert_eq!(events[0].index, Some(0));
        assert_eq!(events[1].index, Some(2));
        assert_eq!(table.parent_of(c), Some(p1));
    }

    #[test]
    fn test_detach_leaves_empty_sequence() {
        let (mut table, p1, _, c) = table();
        let mut events = Vec::new();
        attach_at(&mut table, p1, "kids", 0, c, &mut events);
        events.clear();

        let slot = detach(&mut table, c, &mut events).unwrap();
        assert_eq!(slot.parent, p1);
        assert_eq!(slot.feature, "kids");
        assert_eq!(table.parent_of(c), None);
        assert_eq!(table.get(p1).unwrap().store.get("kids"), Some(&Slot::Many(vec![])));
        assert_eq!(events[0].index, Some(0));

        // parentless: nothing to do
        events.clear();
        assert!(detach(&mut table, c, &mut events).is_none());
        assert!(events.is_empty());
    }
}
