//! Response envelopes and query types shared by handlers.

mod pagination;
mod response;

pub use pagination::{CoursePage, Paginated, PaginationMeta, PaginationParams};
pub use response::{Created, NoContent, Notice};
