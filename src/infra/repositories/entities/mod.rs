//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod assessment;
pub mod assessment_attempt;
pub mod assessment_question;
pub mod certificate;
pub mod conversation;
pub mod conversation_participant;
pub mod course;
pub mod enrollment;
pub mod enrollment_lesson;
pub mod lesson;
pub mod message;
pub mod payment_order;
pub mod quiz;
pub mod quiz_attempt;
pub mod quiz_question;
pub mod review;
pub mod user;
