pub mod comment_service;
pub mod post_service;
pub mod share_service;
