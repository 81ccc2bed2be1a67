mod interpreter;
mod projector;
mod site_event_service;
mod site_service;

pub use interpreter::*;
pub use projector::*;
pub use site_event_service::*;
pub use site_service::*;
