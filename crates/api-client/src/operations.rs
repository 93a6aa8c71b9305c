//! Backend calls packaged as fetchable operations
//!
//! Each operation binds the client and whatever request parameters the
//! screen chose, so a fetcher can run it without knowing anything about
//! HTTP. Filter-carrying operations also expose the dependency set a screen
//! should mount with: rebuild the operation with new filters, resubmit the
//! dependency set, and the fetcher re-runs exactly once.

use crate::client::ApiClient;
use crate::types::{
    Announcement, Assignment, AssignmentFilters, Course, CourseFilters,
    DashboardStats, Profile, SubmissionDraft, SubmissionReceipt,
};
use app_state::{DepSet, Operation};
use async_trait::async_trait;
use parking_lot::RwLock;

/// Fetch the authenticated user's profile
pub struct ProfileOperation {
    client: ApiClient,
}

impl ProfileOperation {
    /// Bind the operation to a client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Operation for ProfileOperation {
    type Output = Profile;
    type Args = ();

    async fn run(&self, _args: ()) -> anyhow::Result<Profile> {
        Ok(self.client.get("users/profile", &[]).await?)
    }
}

/// Fetch the course list for the current filters
///
/// Filters are interiorly mutable: a screen updates them through the
/// fetcher's operation accessor and resubmits [`CoursesOperation::dep_set`]
/// to trigger the re-run.
pub struct CoursesOperation {
    client: ApiClient,
    filters: RwLock<CourseFilters>,
}

impl CoursesOperation {
    /// Bind the operation to a client and filter set
    pub fn new(client: ApiClient, filters: CourseFilters) -> Self {
        Self { client, filters: RwLock::new(filters) }
    }

    /// Replace the bound filters
    pub fn set_filters(&self, filters: CourseFilters) {
        *self.filters.write() = filters;
    }

    /// Dependency set for the currently bound filters
    pub fn dep_set(&self) -> DepSet {
        DepSet::new().with(&*self.filters.read())
    }
}

#[async_trait]
impl Operation for CoursesOperation {
    type Output = Vec<Course>;
    type Args = ();

    async fn run(&self, _args: ()) -> anyhow::Result<Vec<Course>> {
        let query = self.filters.read().to_query();
        Ok(self.client.get("courses", &query).await?)
    }
}

/// Fetch the assignment list for the current filters
pub struct AssignmentsOperation {
    client: ApiClient,
    filters: RwLock<AssignmentFilters>,
}

impl AssignmentsOperation {
    /// Bind the operation to a client and filter set
    pub fn new(client: ApiClient, filters: AssignmentFilters) -> Self {
        Self { client, filters: RwLock::new(filters) }
    }

    /// Replace the bound filters
    pub fn set_filters(&self, filters: AssignmentFilters) {
        *self.filters.write() = filters;
    }

    /// Dependency set for the currently bound filters
    pub fn dep_set(&self) -> DepSet {
        DepSet::new().with(&*self.filters.read())
    }
}

#[async_trait]
impl Operation for AssignmentsOperation {
    type Output = Vec<Assignment>;
    type Args = ();

    async fn run(&self, _args: ()) -> anyhow::Result<Vec<Assignment>> {
        let query = self.filters.read().to_query();
        Ok(self.client.get("assignments", &query).await?)
    }
}

/// Fetch the aggregate numbers for the dashboard home screen
pub struct DashboardStatsOperation {
    client: ApiClient,
}

impl DashboardStatsOperation {
    /// Bind the operation to a client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Operation for DashboardStatsOperation {
    type Output = DashboardStats;
    type Args = ();

    async fn run(&self, _args: ()) -> anyhow::Result<DashboardStats> {
        Ok(self.client.get("analytics/dashboard", &[]).await?)
    }
}

/// Fetch current announcements
pub struct AnnouncementsOperation {
    client: ApiClient,
}

impl AnnouncementsOperation {
    /// Bind the operation to a client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Operation for AnnouncementsOperation {
    type Output = Vec<Announcement>;
    type Args = ();

    async fn run(&self, _args: ()) -> anyhow::Result<Vec<Announcement>> {
        Ok(self.client.get("announcements", &[]).await?)
    }
}

/// Submit assignment content, driven through `refetch_with`
///
/// The argument is the submission content so a form can resubmit through
/// the same mounted fetcher. Empty content is rejected client-side.
pub struct SubmitAssignmentOperation {
    client: ApiClient,
    assignment_id: u64,
}

impl SubmitAssignmentOperation {
    /// Bind the operation to a client and target assignment
    pub fn new(client: ApiClient, assignment_id: u64) -> Self {
        Self { client, assignment_id }
    }
}

#[async_trait]
impl Operation for SubmitAssignmentOperation {
    type Output = SubmissionReceipt;
    type Args = String;

    async fn run(&self, content: String) -> anyhow::Result<SubmissionReceipt> {
        if content.trim().is_empty() {
            anyhow::bail!("submission content is empty");
        }
        let draft = SubmissionDraft {
            assignment_id: self.assignment_id,
            content,
        };
        let path = format!("assignments/{}/submissions", self.assignment_id);
        Ok(self.client.post(&path, &draft).await?)
    }
}
