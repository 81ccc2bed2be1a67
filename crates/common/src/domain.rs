mod envelope;
mod outcome;
mod result;
mod site;

pub use envelope::*;
pub use outcome::*;
pub use result::*;
pub use site::*;
