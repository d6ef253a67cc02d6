//! Read-time aggregation of reactions.

use classhub_core::types::UserId;
use serde::{Deserialize, Serialize};

use super::model::Reaction;

/// Reactions on a message grouped by emoji.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSummary {
    /// The emoji.
    pub emoji: String,
    /// Number of users who reacted with it.
    pub count: usize,
    /// Who reacted, in reaction order.
    pub user_ids: Vec<UserId>,
}

impl ReactionSummary {
    /// Group reactions for a single message by emoji. Groups are ordered by
    /// the first time each emoji was used.
    pub fn aggregate<'a>(reactions: impl IntoIterator<Item = &'a Reaction>) -> Vec<Self> {
        let mut summaries: Vec<Self> = Vec::new();
        for reaction in reactions {
            match summaries.iter_mut().find(|s| s.emoji == reaction.emoji) {
                Some(summary) => {
                    summary.count += 1;
                    summary.user_ids.push(reaction.user_id);
                }
                None => summaries.push(Self {
                    emoji: reaction.emoji.clone(),
                    count: 1,
                    user_ids: vec![reaction.user_id],
                }),
            }
        }
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use classhub_core::types::MessageId;

    #[test]
    fn test_aggregate_groups_by_emoji() {
        let message_id = MessageId::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let reactions = vec![
            Reaction {
                message_id,
                user_id: alice,
                emoji: "👍".into(),
                created_at: Utc::now(),
            },
            Reaction {
                message_id,
                user_id: bob,
                emoji: "🎉".into(),
                created_at: Utc::now(),
            },
            Reaction {
                message_id,
                user_id: bob,
                emoji: "👍".into(),
                created_at: Utc::now(),
            },
        ];

        let summaries = ReactionSummary::aggregate(&reactions);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].emoji, "👍");
        assert_eq!(summaries[0].count, 2);
        assert_eq!(summaries[0].user_ids, vec![alice, bob]);
        assert_eq!(summaries[1].count, 1);
    }
}
