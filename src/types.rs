//! Shared type aliases used across the crate.

use uuid::Uuid;

pub type UserId = Uuid;
pub type VideoId = Uuid;
pub type CommentId = Uuid;
pub type TweetId = Uuid;
pub type PlaylistId = Uuid;
pub type LikeId = Uuid;
pub type SubscriptionId = Uuid;

/// Abbreviate a UUID for tracing fields (first 8 hex chars).
pub fn abbrev_uuid(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbrev_uuid_is_eight_chars() {
        let id = Uuid::new_v4();
        let short = abbrev_uuid(&id);
        assert_eq!(short.len(), 8);
        assert!(id.simple().to_string().starts_with(&short));
    }
}
