//! Wire payloads for the dashboard backend
//!
//! Field names follow the backend's camelCase JSON. Filters serialize both
//! into query parameters (for requests) and into dependency sets (so a
//! screen's fetcher re-runs when its filter controls change).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storage::UserRole;

/// Authenticated user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// User id
    pub id: u64,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Role driving the dashboard view
    pub role: UserRole,
}

/// A course the user can see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Course id
    pub id: u64,
    /// Short course code (e.g., "MATH101")
    pub code: String,
    /// Full course name
    pub name: String,
    /// Instructor display name
    pub instructor: String,
    /// Credit hours
    pub credits: u8,
}

/// Course list filters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFilters {
    /// Restrict to a semester (e.g., "fall-2025")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    /// Restrict to a department code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl CourseFilters {
    /// Query parameters for the courses endpoint
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(semester) = &self.semester {
            query.push(("semester", semester.clone()));
        }
        if let Some(department) = &self.department {
            query.push(("department", department.clone()));
        }
        query
    }
}

/// Assignment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    /// Published, not yet submitted
    Pending,
    /// Submitted, awaiting grading
    Submitted,
    /// Graded
    Graded,
}

impl AssignmentStatus {
    /// Lowercase wire name of the status
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Submitted => "submitted",
            AssignmentStatus::Graded => "graded",
        }
    }
}

/// An assignment in a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Assignment id
    pub id: u64,
    /// Owning course id
    pub course_id: u64,
    /// Assignment title
    pub title: String,
    /// Due date
    pub due_date: DateTime<Utc>,
    /// Current status
    pub status: AssignmentStatus,
}

/// Assignment list filters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentFilters {
    /// Restrict to a course
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<u64>,
    /// Restrict to a status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AssignmentStatus>,
}

impl AssignmentFilters {
    /// Query parameters for the assignments endpoint
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(course_id) = self.course_id {
            query.push(("courseId", course_id.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.as_str().to_string()));
        }
        query
    }
}

/// Aggregate numbers for the dashboard home screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Courses currently in progress
    pub active_courses: u32,
    /// Assignments awaiting submission
    pub pending_assignments: u32,
    /// Grade average across graded work, 0-100
    pub average_grade: f32,
    /// Attendance rate, 0-1
    pub attendance_rate: f32,
}

/// A campus-wide or course announcement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    /// Announcement id
    pub id: u64,
    /// Headline
    pub title: String,
    /// Body text
    pub body: String,
    /// Publication time
    pub posted_at: DateTime<Utc>,
}

/// Body posted when submitting an assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDraft {
    /// Target assignment
    pub assignment_id: u64,
    /// Submission content
    pub content: String,
}

/// Acknowledgement of an accepted submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Submission id
    pub id: u64,
    /// Target assignment
    pub assignment_id: u64,
    /// When the backend recorded the submission
    pub submitted_at: DateTime<Utc>,
    /// Whether it arrived before the deadline
    pub accepted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_backend_shape() {
        let profile: Profile = serde_json::from_str(
            r#"{"id": 12, "name": "Dr. Sarah Mirza", "email": "sarah@faculty.edu", "role": "faculty"}"#,
        )
        .unwrap();

        assert_eq!(profile.id, 12);
        assert_eq!(profile.role, UserRole::Faculty);
        assert_eq!(profile.role.accent_color(), "#8311f2");
    }

    #[test]
    fn test_course_deserializes_backend_shape() {
        let course: Course = serde_json::from_str(
            r#"{"id": 1, "code": "MATH101", "name": "Calculus I", "instructor": "Dr. Khan", "credits": 3}"#,
        )
        .unwrap();

        assert_eq!(course.code, "MATH101");
        assert_eq!(course.credits, 3);
    }

    #[test]
    fn test_course_filters_query() {
        assert!(CourseFilters::default().to_query().is_empty());

        let filters = CourseFilters {
            semester: Some("fall-2025".to_string()),
            department: None,
        };
        assert_eq!(filters.to_query(), vec![("semester", "fall-2025".to_string())]);
    }

    #[test]
    fn test_assignment_deserializes_with_due_date() {
        let assignment: Assignment = serde_json::from_str(
            r#"{"id": 4, "courseId": 1, "title": "Problem set 3",
                "dueDate": "2025-11-30T23:59:00Z", "status": "pending"}"#,
        )
        .unwrap();

        assert_eq!(assignment.course_id, 1);
        assert_eq!(assignment.status, AssignmentStatus::Pending);
        assert_eq!(assignment.due_date.to_rfc3339(), "2025-11-30T23:59:00+00:00");
    }

    #[test]
    fn test_assignment_filters_query() {
        let filters = AssignmentFilters {
            course_id: Some(7),
            status: Some(AssignmentStatus::Submitted),
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("courseId", "7".to_string()),
                ("status", "submitted".to_string()),
            ]
        );
    }

    #[test]
    fn test_dashboard_stats_deserializes() {
        let stats: DashboardStats = serde_json::from_str(
            r#"{"activeCourses": 5, "pendingAssignments": 3,
                "averageGrade": 87.5, "attendanceRate": 0.93}"#,
        )
        .unwrap();

        assert_eq!(stats.active_courses, 5);
        assert_eq!(stats.pending_assignments, 3);
    }

    #[test]
    fn test_filters_skip_none_fields_when_serialized() {
        let json = serde_json::to_string(&CourseFilters::default()).unwrap();
        assert_eq!(json, "{}");

        let json = serde_json::to_string(&AssignmentFilters {
            course_id: Some(7),
            status: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"courseId":7}"#);
    }
}
