//! Group schedule: admins add and remove activities, members ask for the next
//! one.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::error::DomainError;
use crate::models::identity::{require_admin, require_authenticated};
use crate::models::schedule::{next_upcoming, parse_schedule};
use crate::models::{
    AddEventRequest, AddEventResponse, CallerIdentity, DeleteEventResponse, GroupRecord,
    NextEventResponse, ScheduleEventRecord,
};
use crate::paths;
use crate::store::{self, DocumentStore, WriteBatch};
use shared::validation::{non_blank, validate_epoch_millis};

#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn DocumentStore>,
}

impl ScheduleService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Adds an activity to a group's schedule.
    pub async fn add_event(
        &self,
        caller: Option<&CallerIdentity>,
        group_id: &str,
        request: AddEventRequest,
    ) -> Result<AddEventResponse, DomainError> {
        let caller = require_authenticated(caller)?;
        require_admin(caller)?;
        let group = self.load_group(group_id).await?;

        let marker_id = non_blank(request.marker_id.as_deref())
            .filter(|m| paths::is_valid_segment(m))
            .ok_or_else(|| DomainError::missing("markerId"))?;
        let start_at = request
            .start_at
            .filter(|s| validate_epoch_millis(*s).is_ok())
            .ok_or_else(|| DomainError::missing("startAt"))?;
        if let Some(end_at) = request.end_at {
            if end_at <= start_at {
                return Err(DomainError::invalid_argument(
                    "endAt",
                    "End time must be after the start time.",
                ));
            }
        }
        let destination_key = non_blank(request.destination_key.as_deref())
            .unwrap_or_else(|| group.city.to_lowercase());

        let event_id = self
            .store
            .generate_id()
            .await
            .ok()
            .filter(|id| paths::is_valid_segment(id))
            .ok_or_else(|| DomainError::Internal("Could not generate eventId.".to_string()))?;

        let mut batch = WriteBatch::new();
        batch.set(
            paths::schedule_event(group_id, &event_id),
            &ScheduleEventRecord {
                marker_id,
                destination_key,
                start_at,
                end_at: request.end_at,
                created_at: Utc::now().timestamp_millis(),
                created_by: caller.uid.clone(),
            },
        )?;
        self.store.commit(batch).await?;

        info!(group_id = %group_id, event_id = %event_id, "Schedule event added");

        Ok(AddEventResponse { event_id })
    }

    /// Removes an activity from a group's schedule.
    pub async fn delete_event(
        &self,
        caller: Option<&CallerIdentity>,
        group_id: &str,
        event_id: &str,
    ) -> Result<DeleteEventResponse, DomainError> {
        let caller = require_authenticated(caller)?;
        require_admin(caller)?;
        self.load_group(group_id).await?;
        if !paths::is_valid_segment(event_id) {
            return Err(DomainError::invalid_argument("eventId", "Invalid event id."));
        }

        let event_path = paths::schedule_event(group_id, event_id);
        if !self.store.exists(&event_path).await? {
            return Err(DomainError::NotFound("Event not found.".to_string()));
        }

        let mut batch = WriteBatch::new();
        batch.delete(event_path);
        self.store.commit(batch).await?;

        info!(group_id = %group_id, event_id = %event_id, "Schedule event deleted");

        Ok(DeleteEventResponse {
            event_id: event_id.to_string(),
        })
    }

    /// The first scheduled activity starting after `now_millis`.
    pub async fn next_event(
        &self,
        caller: Option<&CallerIdentity>,
        group_id: &str,
        now_millis: i64,
    ) -> Result<NextEventResponse, DomainError> {
        let caller = require_authenticated(caller)?;
        self.load_group(group_id).await?;

        if !caller.admin
            && !self
                .store
                .exists(&paths::group_member(group_id, &caller.uid))
                .await?
        {
            return Err(DomainError::PermissionDenied(
                "Only group members can view the schedule.".to_string(),
            ));
        }

        let raw = self
            .store
            .get(&paths::group_schedule(group_id))
            .await?
            .unwrap_or_default();
        let events = parse_schedule(&raw);

        Ok(NextEventResponse {
            event: next_upcoming(&events, now_millis).cloned(),
        })
    }

    async fn load_group(&self, group_id: &str) -> Result<GroupRecord, DomainError> {
        if !paths::is_valid_segment(group_id) {
            return Err(DomainError::invalid_argument("groupId", "Invalid group id."));
        }
        store::read(self.store.as_ref(), &paths::group(group_id))
            .await?
            .ok_or_else(|| DomainError::NotFound("Group not found.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{CreateGroupRequest, JoinGroupRequest};
    use crate::services::groups::{GroupPolicy, GroupService};
    use crate::store::MemoryStore;

    struct Fixture {
        store: MemoryStore,
        schedule: ScheduleService,
        group_id: String,
        code: String,
    }

    fn admin() -> CallerIdentity {
        CallerIdentity::new("U1", true)
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let groups = GroupService::new(Arc::new(store.clone()), GroupPolicy::default());
        let created = groups
            .create_group(
                Some(&admin()),
                CreateGroupRequest {
                    name: Some("Krakow Feb".to_string()),
                    city: Some("Krakow".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        Fixture {
            schedule: ScheduleService::new(Arc::new(store.clone())),
            store,
            group_id: created.group_id,
            code: created.code,
        }
    }

    fn event(marker: &str, start_at: i64) -> AddEventRequest {
        AddEventRequest {
            marker_id: Some(marker.to_string()),
            start_at: Some(start_at),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_event_defaults_destination_to_city() {
        let f = fixture().await;
        let added = f
            .schedule
            .add_event(Some(&admin()), &f.group_id, event("wawel", 1_000))
            .await
            .unwrap();

        let stored: ScheduleEventRecord = store::read(
            &f.store,
            &paths::schedule_event(&f.group_id, &added.event_id),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(stored.marker_id, "wawel");
        assert_eq!(stored.destination_key, "krakow");
        assert_eq!(stored.start_at, 1_000);
        assert_eq!(stored.created_by, "U1");
    }

    #[tokio::test]
    async fn test_add_event_validation() {
        let f = fixture().await;

        let err = f
            .schedule
            .add_event(Some(&admin()), &f.group_id, AddEventRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("markerId"));

        let err = f
            .schedule
            .add_event(Some(&admin()), &f.group_id, event("wawel", 0))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("startAt"));

        let err = f
            .schedule
            .add_event(
                Some(&admin()),
                &f.group_id,
                AddEventRequest {
                    end_at: Some(500),
                    ..event("wawel", 1_000)
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("endAt"));
    }

    #[tokio::test]
    async fn test_add_event_requires_admin() {
        let f = fixture().await;
        let err = f
            .schedule
            .add_event(
                Some(&CallerIdentity::new("U2", false)),
                &f.group_id,
                event("wawel", 1_000),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_add_event_unknown_group() {
        let f = fixture().await;
        let err = f
            .schedule
            .add_event(Some(&admin()), "missing", event("wawel", 1_000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_next_event_picks_first_upcoming() {
        let f = fixture().await;
        for (marker, start_at) in [("rynek", 3_000), ("wawel", 1_000), ("kazimierz", 2_000)] {
            f.schedule
                .add_event(Some(&admin()), &f.group_id, event(marker, start_at))
                .await
                .unwrap();
        }

        let next = f
            .schedule
            .next_event(Some(&admin()), &f.group_id, 1_500)
            .await
            .unwrap();
        assert_eq!(next.event.map(|e| e.marker_id), Some("kazimierz".to_string()));

        let none = f
            .schedule
            .next_event(Some(&admin()), &f.group_id, 3_000)
            .await
            .unwrap();
        assert!(none.event.is_none());
    }

    #[tokio::test]
    async fn test_next_event_empty_schedule() {
        let f = fixture().await;
        let next = f
            .schedule
            .next_event(Some(&admin()), &f.group_id, 0)
            .await
            .unwrap();
        assert!(next.event.is_none());
    }

    #[tokio::test]
    async fn test_next_event_members_only() {
        let f = fixture().await;
        let guest = CallerIdentity::new("U2", false);

        let err = f
            .schedule
            .next_event(Some(&guest), &f.group_id, 0)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        GroupService::new(Arc::new(f.store.clone()), GroupPolicy::default())
            .join_group(
                Some(&guest),
                JoinGroupRequest {
                    code: Some(f.code.clone()),
                },
            )
            .await
            .unwrap();
        assert!(f
            .schedule
            .next_event(Some(&guest), &f.group_id, 0)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_delete_event() {
        let f = fixture().await;
        let keep = f
            .schedule
            .add_event(Some(&admin()), &f.group_id, event("rynek", 2_000))
            .await
            .unwrap();
        let gone = f
            .schedule
            .add_event(Some(&admin()), &f.group_id, event("wawel", 1_000))
            .await
            .unwrap();

        let deleted = f
            .schedule
            .delete_event(Some(&admin()), &f.group_id, &gone.event_id)
            .await
            .unwrap();
        assert_eq!(deleted.event_id, gone.event_id);
        assert!(!f
            .store
            .exists(&paths::schedule_event(&f.group_id, &gone.event_id))
            .await
            .unwrap());

        let next = f
            .schedule
            .next_event(Some(&admin()), &f.group_id, 0)
            .await
            .unwrap();
        assert_eq!(next.event.map(|e| e.id), Some(keep.event_id));

        let err = f
            .schedule
            .delete_event(Some(&admin()), &f.group_id, &gone.event_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_event_checks() {
        let f = fixture().await;
        let added = f
            .schedule
            .add_event(Some(&admin()), &f.group_id, event("wawel", 1_000))
            .await
            .unwrap();

        let err = f
            .schedule
            .delete_event(None, &f.group_id, &added.event_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);

        let err = f
            .schedule
            .delete_event(
                Some(&CallerIdentity::new("U2", false)),
                &f.group_id,
                &added.event_id,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        let err = f
            .schedule
            .delete_event(Some(&admin()), "missing", &added.event_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = f
            .schedule
            .delete_event(Some(&admin()), &f.group_id, "bad$id")
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("eventId"));

        assert!(f
            .store
            .exists(&paths::schedule_event(&f.group_id, &added.event_id))
            .await
            .unwrap());
    }
}
