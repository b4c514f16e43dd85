//! Shared identifier types.

use uuid::Uuid;

// Type aliases for IDs
pub type AccountId = Uuid;
pub type ApiKeyId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
