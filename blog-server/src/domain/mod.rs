pub mod comment;
pub mod error;
pub mod pagination;
pub mod post;
pub mod tag;
