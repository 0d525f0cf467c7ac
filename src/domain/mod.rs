pub mod error;
pub mod model;
pub mod prompt;
pub mod stats;
pub mod traits;
