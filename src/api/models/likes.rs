use serde::Serialize;
use utoipa::ToSchema;

/// Result of a like/unlike toggle.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LikeToggleResponse {
    /// Whether the like exists after the toggle.
    pub liked: bool,
}
