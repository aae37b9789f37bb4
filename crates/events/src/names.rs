//! Event names. Each must have a matching row in `event_types`, otherwise
//! the persistence subscriber drops the event with a warning.

pub const SESSION_PROVISIONED: &str = "retrospective.session_provisioned";
pub const PARTICIPANT_JOINED: &str = "retrospective.participant_joined";
pub const PARTICIPANT_LEFT: &str = "retrospective.participant_left";
pub const ROOM_EVICTED: &str = "retrospective.room_evicted";

/// Entity type used as `source_entity_type` for sprint-scoped events.
pub const SPRINT_ENTITY: &str = "sprint";
