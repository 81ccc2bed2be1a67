mod site_event_processor;

pub use site_event_processor::*;
