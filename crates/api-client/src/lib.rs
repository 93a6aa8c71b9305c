//! HTTP client for the Lectern dashboard backend
//!
//! This crate owns all knowledge of endpoints and payload shapes. Screens
//! never talk HTTP directly: each backend call is packaged as an
//! `app_state::Operation` that a fetcher can mount, so the rest of the
//! application only ever sees resolved domain values or rejections.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod operations;
pub mod types;

pub use client::{ApiClient, ApiConfig, ApiError};
pub use operations::{
    AnnouncementsOperation, AssignmentsOperation, CoursesOperation,
    DashboardStatsOperation, ProfileOperation, SubmitAssignmentOperation,
};
