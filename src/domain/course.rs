//! Catalog entities: courses and their lessons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Publication state of a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Draft,
    Published,
    Unpublished,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "draft",
            CourseStatus::Published => "published",
            CourseStatus::Unpublished => "unpublished",
        }
    }
}

impl TryFrom<&str> for CourseStatus {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "draft" => Ok(CourseStatus::Draft),
            "published" => Ok(CourseStatus::Published),
            "unpublished" => Ok(CourseStatus::Unpublished),
            other => Err(AppError::validation(format!(
                "Unknown course status '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Course aggregate. Rating fields are a cache over the course's reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub instructor_id: Uuid,
    pub title: String,
    pub description: String,
    /// Price in the smallest currency unit
    pub price: i64,
    pub status: CourseStatus,
    pub average_rating: f64,
    pub num_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.instructor_id == user_id
    }

    /// Fails with `Forbidden` unless `user_id` is the owning instructor.
    pub fn ensure_owner(&self, user_id: Uuid) -> AppResult<()> {
        if self.is_owned_by(user_id) {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Only the course instructor can perform this action",
            ))
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == CourseStatus::Published
    }

    pub fn is_free(&self) -> bool {
        self.price == 0
    }
}

/// Fields accepted when creating a course
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub instructor_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64,
}

/// Partial update of a course
#[derive(Debug, Clone, Default)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
}

/// Downloadable attachment of a lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LessonResource {
    #[schema(example = "Slides")]
    pub title: String,
    #[schema(example = "https://media.example.com/slides.pdf")]
    pub url: String,
}

/// A single lesson. `order_index` is advisory; duplicates are allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub duration_minutes: i32,
    pub is_preview: bool,
    pub content: String,
    pub video_url: Option<String>,
    pub resources: Vec<LessonResource>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a lesson
#[derive(Debug, Clone)]
pub struct NewLesson {
    pub course_id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub duration_minutes: i32,
    pub is_preview: bool,
    pub content: String,
    pub video_url: Option<String>,
    pub resources: Vec<LessonResource>,
}

/// Partial update of a lesson
#[derive(Debug, Clone, Default)]
pub struct LessonChanges {
    pub title: Option<String>,
    pub order_index: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub is_preview: Option<bool>,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub resources: Option<Vec<LessonResource>>,
}

/// Sort lessons into curriculum order: `order_index`, then creation time.
pub fn curriculum_order(lessons: &mut [Lesson]) {
    lessons.sort_by(|a, b| {
        a.order_index
            .cmp(&b.order_index)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

/// Course as returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: Uuid,
    pub instructor_id: Uuid,
    #[schema(example = "Rust for Backend Engineers")]
    pub title: String,
    pub description: String,
    #[schema(example = 49900)]
    pub price: i64,
    pub status: CourseStatus,
    #[schema(example = 4.5)]
    pub average_rating: f64,
    pub num_reviews: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            instructor_id: course.instructor_id,
            title: course.title,
            description: course.description,
            price: course.price,
            status: course.status,
            average_rating: course.average_rating,
            num_reviews: course.num_reviews,
            created_at: course.created_at,
        }
    }
}

/// Lesson as returned to clients. Body fields are `None` when the viewer
/// may only see the curriculum outline.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub duration_minutes: i32,
    pub is_preview: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<LessonResource>>,
    pub locked: bool,
}

impl LessonResponse {
    /// Full lesson including its body
    pub fn full(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            course_id: lesson.course_id,
            title: lesson.title,
            order_index: lesson.order_index,
            duration_minutes: lesson.duration_minutes,
            is_preview: lesson.is_preview,
            content: Some(lesson.content),
            video_url: lesson.video_url,
            resources: Some(lesson.resources),
            locked: false,
        }
    }

    /// Outline only; body withheld
    pub fn outline(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            course_id: lesson.course_id,
            title: lesson.title,
            order_index: lesson.order_index,
            duration_minutes: lesson.duration_minutes,
            is_preview: lesson.is_preview,
            content: None,
            video_url: None,
            resources: None,
            locked: true,
        }
    }

    /// Preview lessons are always readable; others need `can_read_body`.
    pub fn for_viewer(lesson: Lesson, can_read_body: bool) -> Self {
        if lesson.is_preview || can_read_body {
            Self::full(lesson)
        } else {
            Self::outline(lesson)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn lesson(order_index: i32, is_preview: bool) -> Lesson {
        Lesson {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            title: format!("Lesson {}", order_index),
            order_index,
            duration_minutes: 10,
            is_preview,
            content: "body".to_string(),
            video_url: Some("https://media.example.com/v.mp4".to_string()),
            resources: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            CourseStatus::try_from("published").unwrap(),
            CourseStatus::Published
        );
        assert!(CourseStatus::try_from("archived").is_err());
    }

    #[test]
    fn test_ownership_check() {
        let owner = Uuid::new_v4();
        let course = Course {
            id: Uuid::new_v4(),
            instructor_id: owner,
            title: "Course".to_string(),
            description: String::new(),
            price: 0,
            status: CourseStatus::Draft,
            average_rating: 0.0,
            num_reviews: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(course.ensure_owner(owner).is_ok());
        assert!(matches!(
            course.ensure_owner(Uuid::new_v4()),
            Err(AppError::Forbidden(_))
        ));
        assert!(course.is_free());
    }

    #[test]
    fn test_curriculum_order_breaks_ties_by_creation() {
        let mut first = lesson(1, false);
        let mut second = lesson(1, false);
        first.created_at = Utc::now() - Duration::minutes(5);
        second.created_at = Utc::now();
        let third = lesson(0, false);

        let mut lessons = vec![second.clone(), third.clone(), first.clone()];
        curriculum_order(&mut lessons);

        let ids: Vec<Uuid> = lessons.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![third.id, first.id, second.id]);
    }

    #[test]
    fn test_non_preview_body_is_withheld() {
        let response = LessonResponse::for_viewer(lesson(1, false), false);
        assert!(response.locked);
        assert!(response.content.is_none());
        assert!(response.video_url.is_none());

        let response = LessonResponse::for_viewer(lesson(1, true), false);
        assert!(!response.locked);
        assert_eq!(response.content.as_deref(), Some("body"));
    }
}
