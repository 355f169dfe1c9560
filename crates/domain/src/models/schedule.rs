//! Group schedule models and the "next activity" derivation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient::{self, as_millis};

/// Stored at `groupSchedules/{groupId}/{eventId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEventRecord {
    pub marker_id: String,
    pub destination_key: String,
    pub start_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<i64>,
    pub created_at: i64,
    pub created_by: String,
}

/// A schedule entry as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEvent {
    pub id: String,
    pub marker_id: String,
    pub start_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_key: Option<String>,
}

/// Request to add an activity to a group's schedule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddEventRequest {
    /// Point of interest the activity takes place at
    #[serde(alias = "locationId", deserialize_with = "lenient::string")]
    pub marker_id: Option<String>,
    /// Start time in milliseconds since epoch
    #[serde(deserialize_with = "lenient::millis")]
    pub start_at: Option<i64>,
    #[serde(deserialize_with = "lenient::millis")]
    pub end_at: Option<i64>,
    /// Defaults to the lowercased group city
    #[serde(deserialize_with = "lenient::string")]
    pub destination_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEventResponse {
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventResponse {
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextEventResponse {
    pub event: Option<ScheduleEvent>,
}

/// Turns a raw `groupSchedules/{groupId}` subtree into events sorted by start.
///
/// Entries without a marker or a positive numeric start time are dropped.
pub fn parse_schedule(raw: &Value) -> Vec<ScheduleEvent> {
    let Some(entries) = raw.as_object() else {
        return Vec::new();
    };

    let mut events: Vec<ScheduleEvent> = entries
        .iter()
        .filter_map(|(id, entry)| {
            let marker_id = entry
                .get("markerId")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())?;
            let start_at = entry.get("startAt").and_then(as_millis).filter(|s| *s > 0)?;
            Some(ScheduleEvent {
                id: id.clone(),
                marker_id: marker_id.to_string(),
                start_at,
                end_at: entry.get("endAt").and_then(as_millis),
                destination_key: entry
                    .get("destinationKey")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect();

    events.sort_by(|a, b| a.start_at.cmp(&b.start_at).then_with(|| a.id.cmp(&b.id)));
    events
}

/// First event starting strictly after `now_millis`. Expects sorted input.
pub fn next_upcoming(events: &[ScheduleEvent], now_millis: i64) -> Option<&ScheduleEvent> {
    events.iter().find(|e| e.start_at > now_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(id: &str, start_at: i64) -> ScheduleEvent {
        ScheduleEvent {
            id: id.to_string(),
            marker_id: format!("m-{}", id),
            start_at,
            end_at: None,
            destination_key: None,
        }
    }

    #[test]
    fn test_parse_schedule_sorts_and_filters() {
        let raw = json!({
            "e3": { "markerId": "wawel", "startAt": 3000 },
            "e1": { "markerId": "rynek", "startAt": 1000, "endAt": 1500, "destinationKey": "krakow" },
            "nomarker": { "startAt": 500 },
            "nostart": { "markerId": "kazimierz" },
            "badstart": { "markerId": "kazimierz", "startAt": "soon" },
            "zero": { "markerId": "kazimierz", "startAt": 0 },
            "junk": 42
        });

        let events = parse_schedule(&raw);
        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e3"]);
        assert_eq!(events[0].end_at, Some(1500));
        assert_eq!(events[0].destination_key.as_deref(), Some("krakow"));
    }

    #[test]
    fn test_parse_empty_container() {
        assert!(parse_schedule(&json!({})).is_empty());
        assert!(parse_schedule(&Value::Null).is_empty());
    }

    #[test]
    fn test_parse_float_start() {
        let events = parse_schedule(&json!({ "e1": { "markerId": "m", "startAt": 1234.0 } }));
        assert_eq!(events[0].start_at, 1234);
    }

    #[test]
    fn test_next_upcoming() {
        let events = vec![event("a", 100), event("b", 200), event("c", 300)];
        assert_eq!(next_upcoming(&events, 50).map(|e| e.id.as_str()), Some("a"));
        assert_eq!(next_upcoming(&events, 200).map(|e| e.id.as_str()), Some("c"));
        assert!(next_upcoming(&events, 300).is_none());
        assert!(next_upcoming(&[], 0).is_none());
    }

    #[test]
    fn test_event_serialization_skips_missing() {
        let value = serde_json::to_value(event("a", 100)).unwrap();
        assert_eq!(value, json!({ "id": "a", "markerId": "m-a", "startAt": 100 }));
    }

    #[test]
    fn test_add_event_request_accepts_location_id() {
        let req: AddEventRequest = serde_json::from_value(json!({
            "groupId": "g1",
            "locationId": "wawel",
            "destinationKey": "krakow",
            "startAt": 1_700_000_000_000i64
        }))
        .unwrap();
        assert_eq!(req.marker_id.as_deref(), Some("wawel"));
        assert_eq!(req.start_at, Some(1_700_000_000_000));
    }

    #[test]
    fn test_add_event_request_wrong_types_are_absent() {
        let req: AddEventRequest =
            serde_json::from_value(json!({ "markerId": 7, "startAt": "tomorrow" })).unwrap();
        assert!(req.marker_id.is_none());
        assert!(req.start_at.is_none());
    }
}
