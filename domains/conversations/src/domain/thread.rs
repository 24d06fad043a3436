//! Reply-thread reconstruction
//!
//! A single-message fetch returns the requested message (level 0) plus its
//! ancestor rows (level 1..n) as a flat list. Each message gets its
//! immediate parent attached as `thread`.
//!
//! The attached parent is a snapshot of its own row taken before any thread
//! is attached, so it never carries a thread of its own: fetching C in
//! A <- B <- C yields `C.thread = [B]` with `B.thread` absent. A shared
//! object graph would instead serialize `B.thread = [A]` inside C; owned
//! snapshots keep every response exactly one hop deep.

use std::collections::HashMap;

use super::entities::{Message, MessageRow};

/// Rebuild the level-0 messages with their one-hop threads, in row order
pub fn reconstruct(rows: Vec<MessageRow>) -> Vec<Message> {
    let mut root_ids = Vec::new();
    let mut lookup: HashMap<i64, Message> = HashMap::with_capacity(rows.len());
    for row in rows {
        if row.level == 0 {
            root_ids.push(row.message.id);
        }
        lookup.insert(row.message.id, row.message);
    }

    let parents: HashMap<i64, Message> = lookup
        .values()
        .filter_map(|message| message.parent)
        .filter_map(|parent_id| lookup.get(&parent_id).cloned())
        .map(|parent| (parent.id, parent))
        .collect();

    for message in lookup.values_mut() {
        if let Some(parent) = message.parent.and_then(|id| parents.get(&id)) {
            message
                .thread
                .get_or_insert_with(Vec::new)
                .push(parent.clone());
        }
    }

    root_ids
        .into_iter()
        .filter_map(|id| lookup.get(&id).cloned())
        .collect()
}
