//! Group registry: which connections receive a conversation's events.
//!
//! Groups are explicit and owned here rather than by the transport. A
//! connection enters a group on `join_conversation` and leaves it on
//! `leave_conversation`, disconnect, or when a roster sync unenrolls its
//! user.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;

use classhub_core::types::ConversationId;

use crate::connection::handle::{ConnectionHandle, ConnectionId};

/// Group name of a conversation.
pub fn conversation_group(id: ConversationId) -> String {
    format!("conversation:{id}")
}

/// Registry of broadcast groups and their member connections.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    /// Group name → member connections.
    groups: DashMap<String, HashMap<ConnectionId, Arc<ConnectionHandle>>>,
    /// Connection ID → groups it belongs to (reverse index).
    memberships: DashMap<ConnectionId, HashSet<String>>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a group. Returns `false` if it was already in.
    pub fn join(&self, group: &str, handle: &Arc<ConnectionHandle>) -> bool {
        let added = self
            .groups
            .entry(group.to_string())
            .or_default()
            .insert(handle.id, Arc::clone(handle))
            .is_none();
        self.memberships
            .entry(handle.id)
            .or_default()
            .insert(group.to_string());
        added
    }

    /// Remove a connection from a group. Returns `false` if it was not in.
    pub fn leave(&self, group: &str, conn_id: ConnectionId) -> bool {
        let removed = self.remove_member(group, conn_id);
        if let Some(mut groups) = self.memberships.get_mut(&conn_id) {
            groups.remove(group);
        }
        removed
    }

    /// Remove a connection from every group. Returns how many it left.
    pub fn leave_all(&self, conn_id: ConnectionId) -> usize {
        let groups = self
            .memberships
            .remove(&conn_id)
            .map(|(_, groups)| groups)
            .unwrap_or_default();
        for group in &groups {
            self.remove_member(group, conn_id);
        }
        groups.len()
    }

    /// Whether a connection is in a group.
    pub fn is_member(&self, group: &str, conn_id: ConnectionId) -> bool {
        self.memberships
            .get(&conn_id)
            .is_some_and(|groups| groups.contains(group))
    }

    /// Snapshot of a group's member connections.
    pub fn members(&self, group: &str) -> Vec<Arc<ConnectionHandle>> {
        self.groups
            .get(group)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Queue `frame` on every member of `group` accepted by `filter`.
    /// Returns the number of connections that took the frame.
    ///
    /// The group's entry stays locked for the whole fan-out, so two
    /// broadcasts to one group reach every member in the same order.
    pub fn broadcast(
        &self,
        group: &str,
        frame: &str,
        filter: impl Fn(&ConnectionHandle) -> bool,
    ) -> usize {
        let Some(members) = self.groups.get_mut(group) else {
            return 0;
        };
        members
            .values()
            .filter(|handle| filter(handle))
            .filter(|handle| handle.send(frame.to_string()))
            .count()
    }

    /// Number of connections in a group.
    pub fn member_count(&self, group: &str) -> usize {
        self.groups.get(group).map(|m| m.len()).unwrap_or(0)
    }

    /// Number of non-empty groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn remove_member(&self, group: &str, conn_id: ConnectionId) -> bool {
        let removed = self
            .groups
            .get_mut(group)
            .is_some_and(|mut members| members.remove(&conn_id).is_some());
        self.groups.remove_if(group, |_, members| members.is_empty());
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classhub_core::types::UserId;
    use classhub_entity::user::UserRole;
    use classhub_service::RequestContext;
    use tokio::sync::mpsc;

    fn connection(user_id: UserId) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        let ctx = RequestContext::new(user_id, UserRole::Student, "Alice");
        (Arc::new(ConnectionHandle::new(ctx, tx)), rx)
    }

    #[test]
    fn test_join_is_idempotent() {
        let registry = ChannelRegistry::new();
        let (a, _rx) = connection(UserId::new());
        let group = conversation_group(ConversationId::new());

        assert!(registry.join(&group, &a));
        assert!(!registry.join(&group, &a));
        assert_eq!(registry.member_count(&group), 1);
        assert!(registry.is_member(&group, a.id));
    }

    #[test]
    fn test_broadcast_reaches_members_only() {
        let registry = ChannelRegistry::new();
        let (a, mut rx_a) = connection(UserId::new());
        let (b, mut rx_b) = connection(UserId::new());
        let (c, mut rx_c) = connection(UserId::new());
        let group = conversation_group(ConversationId::new());
        registry.join(&group, &a);
        registry.join(&group, &b);
        registry.join(&conversation_group(ConversationId::new()), &c);

        assert_eq!(registry.broadcast(&group, "hi", |_| true), 2);
        assert_eq!(rx_a.try_recv().unwrap(), "hi");
        assert_eq!(rx_b.try_recv().unwrap(), "hi");
        assert!(rx_c.try_recv().is_err());

        let a_user = a.user_id();
        assert_eq!(registry.broadcast(&group, "x", |h| h.user_id() != a_user), 1);
        assert!(rx_a.try_recv().is_err());
        assert_eq!(rx_b.try_recv().unwrap(), "x");
    }

    #[test]
    fn test_leave_all_cleans_empty_groups() {
        let registry = ChannelRegistry::new();
        let (a, _rx) = connection(UserId::new());
        let first = conversation_group(ConversationId::new());
        let second = conversation_group(ConversationId::new());
        registry.join(&first, &a);
        registry.join(&second, &a);
        assert_eq!(registry.group_count(), 2);

        assert!(registry.leave(&first, a.id));
        assert!(!registry.leave(&first, a.id));
        assert!(!registry.is_member(&first, a.id));

        assert_eq!(registry.members(&second).len(), 1);
        assert_eq!(registry.leave_all(a.id), 1);
        assert_eq!(registry.group_count(), 0);
        assert_eq!(registry.broadcast(&second, "gone", |_| true), 0);
    }
}
