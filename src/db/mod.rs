//! Database layer for data persistence and access.
//!
//! SQLx over PostgreSQL, following the Repository pattern:
//!
//! - [`handlers`]: repository implementations (queries and business rules)
//! - [`models`]: database record structures matching table schemas
//! - [`errors`]: database-specific error types
//!
//! Repositories work with SQLx connections or transactions. For multi-step
//! writes, create the repository from a transaction so ACID properties hold:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let mut users = Users::new(&mut tx);
//! // ... operations ...
//! tx.commit().await?;
//! ```
//!
//! Migrations live in `migrations/` and are embedded via [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
