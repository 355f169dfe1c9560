//! Document store layout.
//!
//! Every persisted record lives at a slash-separated path. Builders here are
//! the only place the layout is spelled out.

pub const GROUPS: &str = "groups";
pub const GROUP_CODES: &str = "groupCodes";
pub const GROUP_MEMBERS: &str = "groupMembers";
pub const USER_GROUPS: &str = "userGroups";
pub const USERS: &str = "users";
pub const GROUP_SCHEDULES: &str = "groupSchedules";

/// Longest key segment accepted by the store.
pub const MAX_SEGMENT_LENGTH: usize = 768;

/// `groups/{groupId}`
pub fn group(group_id: &str) -> String {
    format!("{}/{}", GROUPS, group_id)
}

/// `groups/{groupId}/{field}`
pub fn group_field(group_id: &str, field: &str) -> String {
    format!("{}/{}/{}", GROUPS, group_id, field)
}

/// `groupCodes/{code}`
pub fn group_code(code: &str) -> String {
    format!("{}/{}", GROUP_CODES, code)
}

/// `groupMembers/{groupId}/{uid}`
pub fn group_member(group_id: &str, uid: &str) -> String {
    format!("{}/{}/{}", GROUP_MEMBERS, group_id, uid)
}

/// `userGroups/{uid}/{groupId}`
pub fn user_group(uid: &str, group_id: &str) -> String {
    format!("{}/{}/{}", USER_GROUPS, uid, group_id)
}

/// `users/{uid}/currentGroupId`
pub fn current_group(uid: &str) -> String {
    format!("{}/{}/currentGroupId", USERS, uid)
}

/// `groupSchedules/{groupId}`
pub fn group_schedule(group_id: &str) -> String {
    format!("{}/{}", GROUP_SCHEDULES, group_id)
}

/// `groupSchedules/{groupId}/{eventId}`
pub fn schedule_event(group_id: &str, event_id: &str) -> String {
    format!("{}/{}/{}", GROUP_SCHEDULES, group_id, event_id)
}

/// Whether `segment` can be used as a single key in a path.
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.len() <= MAX_SEGMENT_LENGTH
        && !segment
            .chars()
            .any(|c| matches!(c, '/' | '.' | '#' | '$' | '[' | ']') || c.is_control())
}

/// Whether `path` is a non-empty sequence of valid segments.
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty() && path.split('/').all(is_valid_segment)
}

/// Whether `ancestor` equals `path` or is one of its ancestors.
pub fn is_same_or_ancestor(ancestor: &str, path: &str) -> bool {
    path == ancestor
        || (path.len() > ancestor.len()
            && path.starts_with(ancestor)
            && path.as_bytes()[ancestor.len()] == b'/')
}

/// Every proper ancestor of `path`, shortest first.
pub fn ancestors(path: &str) -> Vec<&str> {
    path.match_indices('/').map(|(idx, _)| &path[..idx]).collect()
}
