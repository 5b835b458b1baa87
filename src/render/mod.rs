pub mod list;
pub mod rows;
pub mod scheduler;

pub use list::{ListRenderer, PopulationState};
pub use rows::{ListBuffer, RowKey, RowView};
pub use scheduler::{RenderError, Scheduler};
