mod handler;
mod model;

pub use handler::{forgot_password, google, login, logout, me, reset_password, signup};
