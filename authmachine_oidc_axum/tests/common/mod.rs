pub mod fixtures;
pub mod test_app;

pub use fixtures::*;
pub use test_app::{TestApp, body_text, location, set_cookie_headers};
