//! A class's current teacher list and enrollment.

use classhub_core::types::{ClassId, UserId};
use serde::{Deserialize, Serialize};

/// Snapshot of who teaches and who is enrolled in a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassRoster {
    /// The class.
    pub class_id: ClassId,
    /// Current teacher ids.
    pub teacher_ids: Vec<UserId>,
    /// Current enrolled student ids.
    pub student_ids: Vec<UserId>,
}

impl ClassRoster {
    /// The conversation member set for this roster: the union of teachers
    /// and students, deduplicated and sorted.
    pub fn member_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self
            .teacher_ids
            .iter()
            .chain(self.student_ids.iter())
            .copied()
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_ids_is_deduplicated_union() {
        let teacher = UserId::new();
        let student = UserId::new();
        let roster = ClassRoster {
            class_id: ClassId::new(),
            teacher_ids: vec![teacher, student],
            student_ids: vec![student],
        };
        let members = roster.member_ids();
        assert_eq!(members.len(), 2);
        assert!(members.contains(&teacher));
        assert!(members.contains(&student));
    }
}
