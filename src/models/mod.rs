// Module exports for models

pub mod category;
pub mod occurrence;
pub mod stats;
pub mod task;
pub mod template;
