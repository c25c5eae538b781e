//! Database models for likes.

use crate::types::{CommentId, TweetId, VideoId};

/// The single entity a like row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Video(VideoId),
    Comment(CommentId),
    Tweet(TweetId),
}

impl LikeTarget {
    /// Column holding this target's id in the likes table.
    pub fn column(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video_id",
            LikeTarget::Comment(_) => "comment_id",
            LikeTarget::Tweet(_) => "tweet_id",
        }
    }

    /// Table the target lives in (for existence checks).
    pub fn table(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "videos",
            LikeTarget::Comment(_) => "comments",
            LikeTarget::Tweet(_) => "tweets",
        }
    }

    pub fn id(&self) -> uuid::Uuid {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => *id,
        }
    }

    /// Human name for error messages.
    pub fn resource(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "Video",
            LikeTarget::Comment(_) => "Comment",
            LikeTarget::Tweet(_) => "Tweet",
        }
    }
}
