mod constants;
mod fake;
mod objs;
mod pods;

pub use constants::*;
pub use fake::*;
pub use objs::*;
pub use pods::*;
