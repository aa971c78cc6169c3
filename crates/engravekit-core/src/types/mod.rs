//! Type system utilities and aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: Type aliases for `Rc<RefCell<T>>` and boxed iterators.

pub mod aliases;

pub use aliases::*;
