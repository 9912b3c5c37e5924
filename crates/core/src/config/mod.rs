//! Pipeline configuration on disk: where the templates document lives, the
//! storage roots path templates are placed under, and a loaded bundle of both.

pub mod context;
pub mod layout;
pub mod roots;
pub mod util;

pub use context::*;
pub use layout::*;
pub use roots::*;
pub use util::*;
