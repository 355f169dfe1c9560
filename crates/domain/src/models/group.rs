//! Trip group domain models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use super::lenient;
use crate::error::DomainError;
use shared::validation::{non_blank, parse_calendar_date, validate_calendar_date};

/// Role within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    /// Creator and host of the trip
    #[serde(alias = "host")]
    Owner,
    Member,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Owner => "owner",
            GroupRole::Member => "member",
        }
    }

    /// Returns true if this role may leave the group on its own
    pub fn can_leave(&self) -> bool {
        matches!(self, GroupRole::Member)
    }
}

impl FromStr for GroupRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            // older clients wrote the creator's role as "host"
            "owner" | "host" => Ok(GroupRole::Owner),
            "member" => Ok(GroupRole::Member),
            _ => Err(format!("Invalid group role: {}", s)),
        }
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a membership is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Left,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
            MembershipStatus::Left => "left",
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored at `groups/{groupId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub city: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub code: String,
    pub created_at: i64,
    pub created_by: String,
}

/// Stored at `groupCodes/{code}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinCodeRecord {
    pub group_id: String,
    pub created_at: i64,
    pub created_by: String,
}

/// Stored at `groupMembers/{groupId}/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub role: GroupRole,
    pub joined_at: i64,
}

/// Stored at `userGroups/{uid}/{groupId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupRecord {
    pub role: GroupRole,
    pub status: MembershipStatus,
    pub joined_at: i64,
}

/// Request payload for creating a group.
///
/// Every field is optional on the wire so that missing and blank values are
/// reported the same way, in a fixed order, by [`CreateGroupRequest::into_new_group`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateGroupRequest {
    #[serde(deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub end_date: Option<String>,
}

/// Request payload for editing a group's name, description and dates.
///
/// City and join code are fixed at creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateGroupRequest {
    #[serde(deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub end_date: Option<String>,
}

impl UpdateGroupRequest {
    /// Validates the edit exactly as a creation in `city` would be.
    pub fn into_new_group(self, city: &str, require_dates: bool) -> Result<NewGroup, DomainError> {
        CreateGroupRequest {
            name: self.name,
            description: self.description,
            city: Some(city.to_string()),
            start_date: self.start_date,
            end_date: self.end_date,
        }
        .into_new_group(require_dates)
    }
}

/// A validated, normalized group creation request.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewGroup {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,

    #[validate(length(max = 100, message = "City must be at most 100 characters"))]
    pub city: String,

    #[validate(custom(function = "validate_optional_date"))]
    pub start_date: String,

    #[validate(custom(function = "validate_optional_date"))]
    pub end_date: String,
}

/// Field names as validator reports them, paired with their wire names.
const NEW_GROUP_FIELDS: [(&str, &str); 5] = [
    ("name", "name"),
    ("city", "city"),
    ("description", "description"),
    ("start_date", "startDate"),
    ("end_date", "endDate"),
];

fn validate_optional_date(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    validate_calendar_date(value)
}

impl CreateGroupRequest {
    /// Trims and defaults every field, then validates.
    ///
    /// Checks run in a fixed order: name, city, the dates when `require_dates`
    /// is set, then format and length limits.
    pub fn into_new_group(self, require_dates: bool) -> Result<NewGroup, DomainError> {
        let name = non_blank(self.name.as_deref()).ok_or_else(|| DomainError::missing("name"))?;
        let city = non_blank(self.city.as_deref()).ok_or_else(|| DomainError::missing("city"))?;
        let start_date = non_blank(self.start_date.as_deref());
        let end_date = non_blank(self.end_date.as_deref());

        if require_dates {
            if start_date.is_none() {
                return Err(DomainError::missing("startDate"));
            }
            if end_date.is_none() {
                return Err(DomainError::missing("endDate"));
            }
        }

        let group = NewGroup {
            name,
            description: non_blank(self.description.as_deref()).unwrap_or_default(),
            city,
            start_date: start_date.unwrap_or_default(),
            end_date: end_date.unwrap_or_default(),
        };

        group.validate().map_err(first_invalid_field)?;

        if let (Some(start), Some(end)) = (
            parse_calendar_date(&group.start_date),
            parse_calendar_date(&group.end_date),
        ) {
            if end < start {
                return Err(DomainError::invalid_argument(
                    "endDate",
                    "End date cannot be before start date",
                ));
            }
        }

        Ok(group)
    }
}

fn first_invalid_field(errors: ValidationErrors) -> DomainError {
    let field_errors = errors.field_errors();
    for (field, wire_name) in NEW_GROUP_FIELDS {
        if let Some(error) = field_errors.get(field).and_then(|errs| errs.first()) {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid '{}'.", wire_name));
            return DomainError::invalid_argument(wire_name, message);
        }
    }
    DomainError::invalid_argument("request", errors.to_string())
}

/// Response after creating a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupResponse {
    pub group_id: String,
    pub code: String,
}

/// Request to join a group using its join code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinGroupRequest {
    #[serde(deserialize_with = "lenient::string")]
    pub code: Option<String>,
}

/// Response after joining a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGroupResponse {
    pub group_id: String,
    pub role: GroupRole,
}

/// Response after leaving a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveGroupResponse {
    pub group_id: String,
    pub status: MembershipStatus,
}
