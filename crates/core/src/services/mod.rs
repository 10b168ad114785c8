pub mod tasks;

pub use tasks::{StoreSnapshot, TaskStore};
