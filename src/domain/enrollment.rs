//! Enrollment of a student in a course and lesson-completion progress.
//!
//! `progress` is a cache: it can always be recomputed from the completed
//! set and the course's current lesson count.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::FULL_PROGRESS;

/// Link between one student and one course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub completed_lessons: Vec<Uuid>,
    /// Whole percent, 0..=100
    pub progress: i32,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    /// Restrict the completed set to the course's current `lesson_ids` and
    /// recompute progress from it. Returns whether the stored value drifted.
    ///
    /// A course without lessons keeps the stored value.
    pub fn sync_with_curriculum(&mut self, lesson_ids: &[Uuid]) -> bool {
        self.completed_lessons.retain(|id| lesson_ids.contains(id));
        let progress = compute_progress(self.completed_lessons.len(), lesson_ids.len())
            .unwrap_or(self.progress);
        let drifted = progress != self.progress;
        self.progress = progress;
        drifted
    }
}

/// Percentage of `completed` over `total`, rounded to the nearest whole
/// percent and capped at 100.
///
/// Returns `None` for a course without lessons so callers keep the prior
/// value instead of dividing by zero.
pub fn compute_progress(completed: usize, total: usize) -> Option<i32> {
    if total == 0 {
        return None;
    }
    let percent = (completed as f64 * 100.0 / total as f64).round() as i32;
    Some(percent.min(FULL_PROGRESS))
}

/// Progress read model (also the result of marking a lesson complete)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub course_id: Uuid,
    pub completed_lessons: Vec<Uuid>,
    #[schema(example = 50)]
    pub progress: i32,
}

impl ProgressResponse {
    /// Read contract for a student without an enrollment row
    pub fn empty(course_id: Uuid) -> Self {
        Self {
            course_id,
            completed_lessons: Vec::new(),
            progress: 0,
        }
    }
}

impl From<Enrollment> for ProgressResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            course_id: enrollment.course_id,
            completed_lessons: enrollment.completed_lessons,
            progress: enrollment.progress,
        }
    }
}

/// Enrollment listing row for the student dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_title: String,
    pub progress: i32,
    pub completed_lessons: usize,
    pub enrolled_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_rounds_to_whole_percent() {
        assert_eq!(compute_progress(2, 4), Some(50));
        assert_eq!(compute_progress(1, 3), Some(33));
        assert_eq!(compute_progress(2, 3), Some(67));
        assert_eq!(compute_progress(4, 4), Some(100));
    }

    #[test]
    fn test_progress_without_lessons_is_not_recomputed() {
        assert_eq!(compute_progress(0, 0), None);
        assert_eq!(compute_progress(3, 0), None);
    }

    #[test]
    fn test_progress_is_capped_after_lessons_are_removed() {
        assert_eq!(compute_progress(5, 4), Some(100));
    }

    #[test]
    fn test_progress_matches_rounded_ratio_for_every_count() {
        for total in 1..=12usize {
            for completed in 0..=total {
                let expected = (completed as f64 * 100.0 / total as f64).round() as i32;
                assert_eq!(compute_progress(completed, total), Some(expected));
            }
        }
    }

    fn enrollment(completed: Vec<Uuid>, progress: i32) -> Enrollment {
        Enrollment {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            completed_lessons: completed,
            progress,
            enrolled_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_added_lesson_lowers_progress() {
        let lessons: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let mut enrollment = enrollment(lessons[..2].to_vec(), 100);

        assert!(enrollment.sync_with_curriculum(&lessons));
        assert_eq!(enrollment.progress, 67);
    }

    #[test]
    fn test_removed_lesson_drops_out_of_completed_set() {
        let kept = Uuid::new_v4();
        let removed = Uuid::new_v4();
        let mut enrollment = enrollment(vec![kept, removed], 67);

        assert!(enrollment.sync_with_curriculum(&[kept]));
        assert_eq!(enrollment.completed_lessons, vec![kept]);
        assert_eq!(enrollment.progress, 100);
    }

    #[test]
    fn test_current_progress_is_not_drift() {
        let lessons: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let mut enrollment = enrollment(lessons[..2].to_vec(), 50);

        assert!(!enrollment.sync_with_curriculum(&lessons));
        assert_eq!(enrollment.progress, 50);
    }

    #[test]
    fn test_empty_progress_read() {
        let course_id = Uuid::new_v4();
        let progress = ProgressResponse::empty(course_id);
        assert_eq!(progress.progress, 0);
        assert!(progress.completed_lessons.is_empty());
    }
}
