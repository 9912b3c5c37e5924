pub mod info;
pub mod keys;
pub mod resolve;
pub mod templates;
pub mod util;
pub mod validate;

pub use info::*;
pub use keys::*;
pub use resolve::*;
pub use templates::*;
pub use util::*;
pub use validate::*;
