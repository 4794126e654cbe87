//! HTTP request handlers.

pub mod assessment_handler;
pub mod auth_handler;
pub mod certificate_handler;
pub mod course_handler;
pub mod enrollment_handler;
pub mod lesson_handler;
pub mod media_handler;
pub mod messaging_handler;
pub mod payment_handler;
pub mod quiz_handler;
pub mod user_handler;
pub mod ws_handler;

pub use assessment_handler::assessment_routes;
pub use auth_handler::auth_routes;
pub use certificate_handler::certificate_routes;
pub use course_handler::course_routes;
pub use enrollment_handler::enrollment_routes;
pub use lesson_handler::lesson_routes;
pub use media_handler::media_routes;
pub use messaging_handler::{conversation_routes, presence_routes};
pub use payment_handler::payment_routes;
pub use quiz_handler::quiz_routes;
pub use user_handler::user_routes;
pub use ws_handler::ws_handler;
