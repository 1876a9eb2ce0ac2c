mod handler;
mod model;

pub use handler::{add_comment, delete_comment};
