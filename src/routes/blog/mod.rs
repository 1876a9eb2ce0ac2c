mod handler;
mod model;

pub use handler::{analyze_post, create_post, delete_post, get_post, list_posts, update_post};
