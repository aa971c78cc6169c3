//! Type aliases for commonly used shared-ownership types.
//!
//! Pattern groups may share one settings object: a single owning group plus
//! zero or more linked groups. The engine is single-threaded, so the shared
//! handle is an `Rc<RefCell<T>>`; a mutation made through any handle is seen
//! by every group holding it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use engravekit_core::types::*;
//!
//! let dashes: Shared<DashSettings> = shared(DashSettings::default());
//! let linked = Shared::clone(&dashes);
//! linked.borrow_mut().dash_length = 3.0;
//! assert_eq!(dashes.borrow().dash_length, 3.0);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
pub type Shared<T> = Rc<RefCell<T>>;

/// A boxed dynamically-typed iterator.
///
/// Used when the concrete iterator type varies at runtime (e.g. forward vs
/// reverse growth along a line).
pub type BoxedIterator<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Create a new `Shared<T>` from a value.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_mutation_visible_through_clones() {
        let a = shared(1.5_f64);
        let b = Rc::clone(&a);
        *b.borrow_mut() = 4.0;
        assert_eq!(*a.borrow(), 4.0);
        assert_eq!(Rc::strong_count(&a), 2);
    }

    #[test]
    fn test_boxed_iterator_direction() {
        let forward = true;
        let it: BoxedIterator<'_, u32> = if forward {
            Box::new(0..3)
        } else {
            Box::new((0..3).rev())
        };
        assert_eq!(it.collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}
