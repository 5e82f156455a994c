pub mod handler;
pub mod hub;
pub mod messages;
pub mod session;

pub use handler::ws_routes;
pub use hub::*;
pub use messages::*;
pub use session::*;
