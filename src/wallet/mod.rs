pub mod sync;
pub mod types;

pub use sync::SyncEngine;
pub use types::*;
