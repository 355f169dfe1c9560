//! Domain models for Hotspot.

pub mod group;
pub mod identity;
pub mod lenient;
pub mod schedule;

pub use group::{
    CreateGroupRequest, CreateGroupResponse, GroupRecord, GroupRole, JoinCodeRecord,
    JoinGroupRequest, JoinGroupResponse, LeaveGroupResponse, MemberRecord, MembershipStatus,
    NewGroup, UpdateGroupRequest, UserGroupRecord,
};
pub use identity::CallerIdentity;
pub use schedule::{
    AddEventRequest, AddEventResponse, DeleteEventResponse, NextEventResponse, ScheduleEvent,
    ScheduleEventRecord,
};
