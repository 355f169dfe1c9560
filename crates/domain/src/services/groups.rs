//! Trip group lifecycle: creation with join-code allocation, editing, joining
//! by code, and leaving.
//!
//! Every operation validates before touching the store and persists through a
//! single atomic [`WriteBatch`], so a failed call leaves nothing behind and can
//! be retried as a whole.

use chrono::Utc;
use metrics::counter;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::DomainError;
use crate::models::identity::{require_admin, require_authenticated};
use crate::models::{
    CallerIdentity, CreateGroupRequest, CreateGroupResponse, GroupRecord, GroupRole,
    JoinCodeRecord, JoinGroupRequest, JoinGroupResponse, LeaveGroupResponse, MemberRecord,
    MembershipStatus, NewGroup, UpdateGroupRequest, UserGroupRecord,
};
use crate::paths;
use crate::services::join_code::{generate_join_code, normalize_join_code};
use crate::store::{self, DocumentStore, StoreError, WriteBatch};

/// Default bound on join-code draws per group creation.
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 20;

/// Deployment policy for group creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPolicy {
    /// Reject requests without start and end dates
    pub require_dates: bool,
    /// Join-code draws before giving up with an internal error
    pub max_code_attempts: u32,
}

impl Default for GroupPolicy {
    fn default() -> Self {
        Self {
            require_dates: false,
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }
}

#[derive(Clone)]
pub struct GroupService {
    store: Arc<dyn DocumentStore>,
    policy: GroupPolicy,
}

impl GroupService {
    pub fn new(store: Arc<dyn DocumentStore>, policy: GroupPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> GroupPolicy {
        self.policy
    }

    /// Creates a group, allocates its join code and makes the caller its owner.
    pub async fn create_group(
        &self,
        caller: Option<&CallerIdentity>,
        request: CreateGroupRequest,
    ) -> Result<CreateGroupResponse, DomainError> {
        let caller = require_authenticated(caller)?;
        require_admin(caller)?;
        let group = request.into_new_group(self.policy.require_dates)?;

        let group_id = self
            .store
            .generate_id()
            .await
            .ok()
            .filter(|id| paths::is_valid_segment(id))
            .ok_or_else(|| DomainError::Internal("Could not generate groupId.".to_string()))?;

        let code_attempts = self.policy.max_code_attempts.max(1);
        for attempt in 1..=code_attempts {
            let code = generate_join_code();
            let code_path = paths::group_code(&code);

            if self.store.exists(&code_path).await? {
                counter!("join_code_collisions_total").increment(1);
                continue;
            }

            let now = Utc::now().timestamp_millis();
            let batch = creation_batch(&group_id, &code, &group, &caller.uid, now)?;

            match self.store.commit(batch).await {
                Ok(()) => {
                    counter!("groups_created_total").increment(1);
                    info!(
                        group_id = %group_id,
                        uid = %caller.uid,
                        attempts = attempt,
                        "Group created"
                    );
                    return Ok(CreateGroupResponse { group_id, code });
                }
                // Another allocation claimed the same code between the check and the commit.
                Err(StoreError::Conflict { path }) if path == code_path => {
                    counter!("join_code_collisions_total").increment(1);
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        counter!("join_code_exhausted_total").increment(1);
        warn!(
            event = "join_code_exhausted",
            group_id = %group_id,
            uid = %caller.uid,
            attempts = code_attempts,
            "Could not allocate a unique join code"
        );
        Err(DomainError::Internal(
            "Could not generate unique code.".to_string(),
        ))
    }

    /// Redeems a join code: the caller becomes a member and the group becomes
    /// their current one. Existing members keep their role.
    pub async fn join_group(
        &self,
        caller: Option<&CallerIdentity>,
        request: JoinGroupRequest,
    ) -> Result<JoinGroupResponse, DomainError> {
        let caller = require_authenticated(caller)?;
        let code = request
            .code
            .as_deref()
            .and_then(normalize_join_code)
            .ok_or_else(|| {
                DomainError::invalid_argument("code", "Join code must be 6 letters or digits.")
            })?;

        let index: JoinCodeRecord = store::read(self.store.as_ref(), &paths::group_code(&code))
            .await?
            .ok_or_else(|| DomainError::NotFound("No group matches this code.".to_string()))?;
        let group_id = index.group_id;

        if !self.store.exists(&paths::group(&group_id)).await? {
            warn!(code = %code, group_id = %group_id, "Join code points at a missing group");
            return Err(DomainError::NotFound(
                "No group matches this code.".to_string(),
            ));
        }

        let existing: Option<MemberRecord> =
            store::read(self.store.as_ref(), &paths::group_member(&group_id, &caller.uid)).await?;
        let member = existing.unwrap_or_else(|| MemberRecord {
            role: GroupRole::Member,
            joined_at: Utc::now().timestamp_millis(),
        });

        let mut batch = WriteBatch::new();
        batch
            .set(paths::group_member(&group_id, &caller.uid), &member)?
            .set(
                paths::user_group(&caller.uid, &group_id),
                &UserGroupRecord {
                    role: member.role,
                    status: MembershipStatus::Active,
                    joined_at: member.joined_at,
                },
            )?
            .set(paths::current_group(&caller.uid), &group_id)?;
        self.store.commit(batch).await?;

        info!(group_id = %group_id, uid = %caller.uid, role = %member.role, "Joined group");

        Ok(JoinGroupResponse {
            group_id,
            role: member.role,
        })
    }

    /// Edits a group's name, description and dates in one batch.
    ///
    /// Fields are checked with the creation rules; city and join code stay as
    /// created. Returns the group as stored after the edit.
    pub async fn update_group(
        &self,
        caller: Option<&CallerIdentity>,
        group_id: &str,
        request: UpdateGroupRequest,
    ) -> Result<GroupRecord, DomainError> {
        let caller = require_authenticated(caller)?;
        require_admin(caller)?;
        if !paths::is_valid_segment(group_id) {
            return Err(DomainError::invalid_argument("groupId", "Invalid group id."));
        }

        let current = store::read::<GroupRecord>(self.store.as_ref(), &paths::group(group_id))
            .await?
            .ok_or_else(|| DomainError::NotFound("Group not found.".to_string()))?;
        let edit = request.into_new_group(&current.city, self.policy.require_dates)?;

        let mut batch = WriteBatch::new();
        batch
            .set(paths::group_field(group_id, "name"), &edit.name)?
            .set(paths::group_field(group_id, "description"), &edit.description)?
            .set(paths::group_field(group_id, "startDate"), &edit.start_date)?
            .set(paths::group_field(group_id, "endDate"), &edit.end_date)?;
        self.store.commit(batch).await?;

        info!(group_id = %group_id, uid = %caller.uid, "Group updated");

        Ok(GroupRecord {
            name: edit.name,
            description: edit.description,
            start_date: edit.start_date,
            end_date: edit.end_date,
            ..current
        })
    }

    /// Ends the caller's membership. Owners cannot leave their own group.
    pub async fn leave_group(
        &self,
        caller: Option<&CallerIdentity>,
        group_id: &str,
    ) -> Result<LeaveGroupResponse, DomainError> {
        let caller = require_authenticated(caller)?;
        if !paths::is_valid_segment(group_id) {
            return Err(DomainError::invalid_argument("groupId", "Invalid group id."));
        }

        let membership = store::read::<UserGroupRecord>(
            self.store.as_ref(),
            &paths::user_group(&caller.uid, group_id),
        )
        .await?
        .filter(|m| m.status == MembershipStatus::Active)
        .ok_or_else(|| DomainError::NotFound("You are not a member of this group.".to_string()))?;

        if !membership.role.can_leave() {
            return Err(DomainError::FailedPrecondition(
                "The group owner cannot leave the group.".to_string(),
            ));
        }

        let current: Option<String> =
            store::read(self.store.as_ref(), &paths::current_group(&caller.uid)).await?;

        let mut batch = WriteBatch::new();
        batch.delete(paths::group_member(group_id, &caller.uid));
        batch.set(
            paths::user_group(&caller.uid, group_id),
            &UserGroupRecord {
                status: MembershipStatus::Left,
                ..membership
            },
        )?;
        if current.as_deref() == Some(group_id) {
            batch.delete(paths::current_group(&caller.uid));
        }
        self.store.commit(batch).await?;

        info!(group_id = %group_id, uid = %caller.uid, "Left group");

        Ok(LeaveGroupResponse {
            group_id: group_id.to_string(),
            status: MembershipStatus::Left,
        })
    }
}

/// Everything a new group needs, as one multi-path update.
fn creation_batch(
    group_id: &str,
    code: &str,
    group: &NewGroup,
    uid: &str,
    now: i64,
) -> Result<WriteBatch, StoreError> {
    let mut batch = WriteBatch::new();
    batch
        .create_only(
            paths::group(group_id),
            &GroupRecord {
                name: group.name.clone(),
                description: group.description.clone(),
                city: group.city.clone(),
                start_date: group.start_date.clone(),
                end_date: group.end_date.clone(),
                code: code.to_string(),
                created_at: now,
                created_by: uid.to_string(),
            },
        )?
        .create_only(
            paths::group_code(code),
            &JoinCodeRecord {
                group_id: group_id.to_string(),
                created_at: now,
                created_by: uid.to_string(),
            },
        )?
        .set(
            paths::group_member(group_id, uid),
            &MemberRecord {
                role: GroupRole::Owner,
                joined_at: now,
            },
        )?
        .set(
            paths::user_group(uid, group_id),
            &UserGroupRecord {
                role: GroupRole::Owner,
                status: MembershipStatus::Active,
                joined_at: now,
            },
        )?
        .set(paths::current_group(uid), &group_id)?
        .set(paths::group_schedule(group_id), &serde_json::json!({}))?;
    Ok(batch)
}
