pub mod comment_repository;
pub mod memory;
pub mod post_repository;
pub mod tag_repository;
pub mod text;
