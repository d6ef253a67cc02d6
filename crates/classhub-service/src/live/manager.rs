//! Live room lifecycle and teacher presence.
//!
//! Room rows live in the [`LiveRoomStore`]; the "teacher is actually here"
//! signal is a TTL key in the [`PresenceStore`], one per teacher and room.
//! The two are independent: a room can stay open while its teacher's key
//! lapses after a network drop, and the key is never consulted to decide
//! room membership. Only the teacher who set a key refreshes or deletes it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use classhub_cache::keys;
use classhub_core::config::LiveConfig;
use classhub_core::error::AppError;
use classhub_core::result::AppResult;
use classhub_core::traits::presence::PresenceStore;
use classhub_core::types::{ClassId, RoomId};
use classhub_auth::JoinTokenMinter;
use classhub_database::{ChatStore, LiveRoomStore};
use classhub_entity::live_room::{LiveRoom, LiveStatus};

use crate::context::RequestContext;

/// Longest accepted room name, in characters.
const MAX_ROOM_NAME_CHARS: usize = 120;

/// What a caller receives after entering a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomJoin {
    pub room_id: RoomId,
    pub join_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Manages live rooms and the TTL-backed teacher presence signal.
#[derive(Debug, Clone)]
pub struct LiveRoomManager {
    rooms: Arc<dyn LiveRoomStore>,
    chat: Arc<dyn ChatStore>,
    presence: Arc<dyn PresenceStore>,
    minter: JoinTokenMinter,
    presence_ttl: Duration,
    create_attempts: u32,
}

impl LiveRoomManager {
    /// Creates a new live room manager.
    pub fn new(
        rooms: Arc<dyn LiveRoomStore>,
        chat: Arc<dyn ChatStore>,
        presence: Arc<dyn PresenceStore>,
        minter: JoinTokenMinter,
        config: &LiveConfig,
    ) -> Self {
        Self {
            rooms,
            chat,
            presence,
            minter,
            presence_ttl: Duration::from_secs(config.presence_ttl_seconds),
            create_attempts: config.create_attempts.max(1),
        }
    }

    /// Override the presence TTL.
    pub fn with_presence_ttl(mut self, ttl: Duration) -> Self {
        self.presence_ttl = ttl;
        self
    }

    /// Open a room for the class, or join the one already open.
    ///
    /// The store admits one open room per class, so concurrent callers
    /// converge on the same room. When the open room closes between the
    /// failed insert and the join, the insert is retried.
    pub async fn create_or_join(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
        room_name: &str,
    ) -> AppResult<RoomJoin> {
        let name = room_name.trim();
        if name.is_empty() || name.chars().count() > MAX_ROOM_NAME_CHARS {
            return Err(AppError::validation(format!(
                "Room name must be 1 to {MAX_ROOM_NAME_CHARS} characters"
            )));
        }
        self.ensure_class_member(ctx, class_id).await?;

        for attempt in 1..=self.create_attempts {
            if let Some(room) = self
                .rooms
                .insert_open_room(class_id, name, ctx.user_id)
                .await?
            {
                info!(
                    room_id = %room.id,
                    class_id = %class_id,
                    user_id = %ctx.user_id,
                    "Live room opened"
                );
                return self.admit(ctx, &room).await;
            }

            let Some(open) = self.rooms.find_open_room(class_id).await? else {
                debug!(class_id = %class_id, attempt, "Open room vanished, retrying create");
                continue;
            };
            if let Some(room) = self.rooms.add_participant(open.id, ctx.user_id).await? {
                debug!(room_id = %room.id, user_id = %ctx.user_id, "Create converged on open room");
                return self.admit(ctx, &room).await;
            }
        }

        warn!(class_id = %class_id, attempts = self.create_attempts, "Live room create did not converge");
        Err(AppError::conflict("Live room is changing state, try again"))
    }

    /// Join an open room by id.
    pub async fn join(&self, ctx: &RequestContext, room_id: RoomId) -> AppResult<RoomJoin> {
        let room = self.require_room(room_id).await?;
        self.ensure_class_member(ctx, room.class_id).await?;

        let room = self
            .rooms
            .add_participant(room_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Live room is closed"))?;

        info!(room_id = %room.id, user_id = %ctx.user_id, "Joined live room");
        self.admit(ctx, &room).await
    }

    /// Leave a room. Leaving a closed room succeeds.
    ///
    /// A teacher leaving clears their presence key at once.
    pub async fn leave(&self, ctx: &RequestContext, room_id: RoomId) -> AppResult<()> {
        let room = self.require_room(room_id).await?;
        if !room.is_open() {
            return Ok(());
        }

        let Some(room) = self.rooms.remove_participant(room_id, ctx.user_id).await? else {
            return Ok(());
        };

        if !room.is_open() {
            info!(room_id = %room.id, "Live room closed");
        }
        if ctx.is_teacher() {
            self.presence
                .delete(&keys::live_teacher_presence(room.id, ctx.user_id))
                .await?;
        }

        info!(room_id = %room.id, user_id = %ctx.user_id, "Left live room");
        Ok(())
    }

    /// Heartbeat from a room participant.
    ///
    /// Only a teacher's ping touches a presence key, and only that teacher's
    /// own; anyone else's is accepted and ignored. Returns whether the key
    /// was touched.
    pub async fn ping(&self, ctx: &RequestContext, room_id: RoomId) -> AppResult<bool> {
        let room = self.require_room(room_id).await?;
        if !ctx.is_teacher() || !room.is_open() || !room.has_participant(&ctx.user_id) {
            return Ok(false);
        }

        let key = keys::live_teacher_presence(room.id, ctx.user_id);
        if self.presence.refresh(&key, self.presence_ttl).await? {
            return Ok(true);
        }

        // The key lapsed (e.g. a network drop); a returning teacher is
        // online again.
        self.presence.set(&key, self.presence_ttl).await?;
        debug!(room_id = %room.id, user_id = %ctx.user_id, "Teacher presence restored");
        Ok(true)
    }

    /// Whether a class is live and whether its teacher is present.
    pub async fn live_status(&self, ctx: &RequestContext, class_id: ClassId) -> AppResult<LiveStatus> {
        self.ensure_class_member(ctx, class_id).await?;

        let Some(room) = self.rooms.find_open_room(class_id).await? else {
            return Ok(LiveStatus::offline());
        };
        // Only teachers ever hold a key, and leaving removes it, so any
        // participant's live key means a teacher is here.
        let mut teacher_online = false;
        for user_id in &room.participant_ids {
            if self
                .presence
                .exists(&keys::live_teacher_presence(room.id, user_id))
                .await?
            {
                teacher_online = true;
                break;
            }
        }

        Ok(LiveStatus {
            is_live: true,
            room_id: Some(room.id),
            teacher_online: Some(teacher_online),
        })
    }

    async fn admit(&self, ctx: &RequestContext, room: &LiveRoom) -> AppResult<RoomJoin> {
        if ctx.is_teacher() {
            let key = keys::live_teacher_presence(room.id, ctx.user_id);
            if let Err(e) = self.presence.set(&key, self.presence_ttl).await {
                warn!(error = %e, room_id = %room.id, "Failed to set teacher presence");
            }
        }

        let token = self
            .minter
            .mint(room.id, ctx.user_id, &ctx.display_name, ctx.role)?;
        Ok(RoomJoin {
            room_id: room.id,
            join_token: token.token,
            expires_at: token.expires_at,
        })
    }

    async fn require_room(&self, room_id: RoomId) -> AppResult<LiveRoom> {
        self.rooms
            .find_room(room_id)
            .await?
            .ok_or_else(|| AppError::not_found("Live room not found"))
    }

    async fn ensure_class_member(&self, ctx: &RequestContext, class_id: ClassId) -> AppResult<()> {
        if ctx.is_admin() {
            return Ok(());
        }
        match self.chat.find_conversation_by_class(class_id).await? {
            Some(conversation) if conversation.has_member(&ctx.user_id) => Ok(()),
            Some(_) => Err(AppError::forbidden("Not a member of this class")),
            None => Err(AppError::not_found("Class not found")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use classhub_core::error::ErrorKind;
    use classhub_core::types::UserId;
    use classhub_database::MemoryStore;
    use classhub_entity::class::ClassRoster;
    use classhub_entity::user::UserRole;

    use crate::test_support::memory_cache;

    struct Fixture {
        manager: LiveRoomManager,
        presence: Arc<dyn PresenceStore>,
        class_id: ClassId,
        teacher: RequestContext,
        alice: RequestContext,
        bob: RequestContext,
    }

    async fn fixture(presence_ttl: Duration) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let presence: Arc<dyn PresenceStore> = memory_cache();

        let teacher = RequestContext::new(UserId::new(), UserRole::Teacher, "Ms. Lee");
        let alice = RequestContext::new(UserId::new(), UserRole::Student, "Alice");
        let bob = RequestContext::new(UserId::new(), UserRole::Student, "Bob");
        let class_id = ClassId::new();
        store
            .sync_members(&ClassRoster {
                class_id,
                teacher_ids: vec![teacher.user_id],
                student_ids: vec![alice.user_id, bob.user_id],
            })
            .await
            .unwrap();

        let config = LiveConfig::default();
        let manager = LiveRoomManager::new(
            store.clone(),
            store,
            Arc::clone(&presence),
            JoinTokenMinter::new(&config),
            &config,
        )
        .with_presence_ttl(presence_ttl);

        Fixture {
            manager,
            presence,
            class_id,
            teacher,
            alice,
            bob,
        }
    }

    async fn teacher_online(f: &Fixture, room_id: RoomId) -> bool {
        f.presence
            .exists(&keys::live_teacher_presence(room_id, f.teacher.user_id))
            .await
            .unwrap()
    }

    async fn status_online(f: &Fixture) -> Option<bool> {
        f.manager
            .live_status(&f.bob, f.class_id)
            .await
            .unwrap()
            .teacher_online
    }

    #[tokio::test]
    async fn test_create_twice_returns_same_room() {
        let f = fixture(Duration::from_secs(90)).await;
        let first = f
            .manager
            .create_or_join(&f.teacher, f.class_id, "Algebra")
            .await
            .unwrap();
        let second = f
            .manager
            .create_or_join(&f.alice, f.class_id, "Algebra again")
            .await
            .unwrap();
        assert_eq!(first.room_id, second.room_id);
        assert_ne!(first.join_token, second.join_token);
    }

    #[tokio::test]
    async fn test_concurrent_creates_converge() {
        let f = fixture(Duration::from_secs(90)).await;
        let (a, b) = tokio::join!(
            f.manager.create_or_join(&f.alice, f.class_id, "Study"),
            f.manager.create_or_join(&f.bob, f.class_id, "Study"),
        );
        assert_eq!(a.unwrap().room_id, b.unwrap().room_id);
    }

    #[tokio::test]
    async fn test_presence_only_for_teachers() {
        let f = fixture(Duration::from_secs(90)).await;
        let room = f
            .manager
            .create_or_join(&f.alice, f.class_id, "Study")
            .await
            .unwrap();
        assert!(!teacher_online(&f, room.room_id).await);

        f.manager.join(&f.teacher, room.room_id).await.unwrap();
        assert!(teacher_online(&f, room.room_id).await);

        let status = f.manager.live_status(&f.bob, f.class_id).await.unwrap();
        assert!(status.is_live);
        assert_eq!(status.room_id, Some(room.room_id));
        assert_eq!(status.teacher_online, Some(true));
    }

    #[tokio::test]
    async fn test_joining_teacher_owns_presence() {
        let f = fixture(Duration::from_millis(150)).await;
        let room = f
            .manager
            .create_or_join(&f.alice, f.class_id, "Study")
            .await
            .unwrap();
        f.manager.join(&f.teacher, room.room_id).await.unwrap();
        assert_eq!(status_online(&f).await, Some(true));

        // The teacher's own pings keep the signal alive past the TTL.
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(f.manager.ping(&f.teacher, room.room_id).await.unwrap());
        }
        assert_eq!(status_online(&f).await, Some(true));

        // The student creator's pings do not stand in for the teacher.
        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(!f.manager.ping(&f.alice, room.room_id).await.unwrap());
        }
        assert_eq!(status_online(&f).await, Some(false));

        // A ping after the lapse brings the teacher back, and leaving
        // clears the signal while the room stays open.
        assert!(f.manager.ping(&f.teacher, room.room_id).await.unwrap());
        assert_eq!(status_online(&f).await, Some(true));

        f.manager.leave(&f.teacher, room.room_id).await.unwrap();
        let status = f.manager.live_status(&f.bob, f.class_id).await.unwrap();
        assert!(status.is_live);
        assert_eq!(status.teacher_online, Some(false));

        // Once out of the room, the teacher's pings are ignored.
        assert!(!f.manager.ping(&f.teacher, room.room_id).await.unwrap());
        assert_eq!(status_online(&f).await, Some(false));
    }

    #[tokio::test]
    async fn test_presence_lapses_without_ping() {
        let f = fixture(Duration::from_millis(150)).await;
        let room = f
            .manager
            .create_or_join(&f.teacher, f.class_id, "Algebra")
            .await
            .unwrap();
        assert!(teacher_online(&f, room.room_id).await);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(f.manager.ping(&f.teacher, room.room_id).await.unwrap());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(teacher_online(&f, room.room_id).await);

        tokio::time::sleep(Duration::from_millis(300)).await;
        let status = f.manager.live_status(&f.alice, f.class_id).await.unwrap();
        assert!(status.is_live);
        assert_eq!(status.teacher_online, Some(false));

        // A ping after the lapse brings the teacher back.
        assert!(f.manager.ping(&f.teacher, room.room_id).await.unwrap());
        assert!(teacher_online(&f, room.room_id).await);
    }

    #[tokio::test]
    async fn test_ping_from_student_is_ignored() {
        let f = fixture(Duration::from_millis(150)).await;
        let room = f
            .manager
            .create_or_join(&f.teacher, f.class_id, "Algebra")
            .await
            .unwrap();
        f.manager.join(&f.alice, room.room_id).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!f.manager.ping(&f.alice, room.room_id).await.unwrap());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!teacher_online(&f, room.room_id).await);
    }

    #[tokio::test]
    async fn test_teacher_leave_clears_presence_immediately() {
        let f = fixture(Duration::from_secs(90)).await;
        let room = f
            .manager
            .create_or_join(&f.teacher, f.class_id, "Algebra")
            .await
            .unwrap();
        f.manager.join(&f.alice, room.room_id).await.unwrap();

        f.manager.leave(&f.teacher, room.room_id).await.unwrap();
        assert!(!teacher_online(&f, room.room_id).await);

        let status = f.manager.live_status(&f.alice, f.class_id).await.unwrap();
        assert!(status.is_live);
        assert_eq!(status.teacher_online, Some(false));
    }

    #[tokio::test]
    async fn test_last_leave_closes_room() {
        let f = fixture(Duration::from_secs(90)).await;
        let room = f
            .manager
            .create_or_join(&f.alice, f.class_id, "Study")
            .await
            .unwrap();
        f.manager.join(&f.bob, room.room_id).await.unwrap();

        f.manager.leave(&f.alice, room.room_id).await.unwrap();
        assert!(f.manager.live_status(&f.bob, f.class_id).await.unwrap().is_live);

        f.manager.leave(&f.bob, room.room_id).await.unwrap();
        assert_eq!(
            f.manager.live_status(&f.bob, f.class_id).await.unwrap(),
            LiveStatus::offline()
        );

        // Leaving again is harmless; joining a closed room is not.
        f.manager.leave(&f.bob, room.room_id).await.unwrap();
        let err = f.manager.join(&f.alice, room.room_id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let reopened = f
            .manager
            .create_or_join(&f.alice, f.class_id, "Study")
            .await
            .unwrap();
        assert_ne!(reopened.room_id, room.room_id);
    }

    #[tokio::test]
    async fn test_outsiders_are_rejected() {
        let f = fixture(Duration::from_secs(90)).await;
        let outsider = RequestContext::new(UserId::new(), UserRole::Teacher, "Other");
        let err = f
            .manager
            .create_or_join(&outsider, f.class_id, "Hijack")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let err = f
            .manager
            .create_or_join(&f.alice, f.class_id, "   ")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = f.manager.leave(&f.alice, RoomId::new()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
