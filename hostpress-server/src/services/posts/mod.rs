pub mod post_params;
pub mod posts_hooks;
pub mod posts_service;
pub mod posts_shared;

pub use post_params::PostParams;
pub use posts_service::PostsService;
