mod types;

pub use types::{MasonryError, Result};
