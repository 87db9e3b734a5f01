mod history;
mod navbar;
pub mod routes;

pub use history::{Navigator, RouteHistory};
pub use navbar::{NavLink, Navbar, Role};
