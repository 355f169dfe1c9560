//! Domain services for Hotspot.
//!
//! Services contain business logic that operates on domain models.

pub mod groups;
pub mod join_code;
pub mod schedule;

pub use groups::{GroupPolicy, GroupService, DEFAULT_MAX_CODE_ATTEMPTS};
pub use join_code::{generate_join_code, is_valid_join_code, normalize_join_code};
pub use schedule::ScheduleService;
