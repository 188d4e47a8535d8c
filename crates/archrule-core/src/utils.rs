//! Utility functions for the provider and rule implementations.

pub mod attributes;
pub mod paths;

#[doc(inline)]
pub use attributes::is_test_only;
#[doc(inline)]
pub use paths::{path_matches, path_segments};
