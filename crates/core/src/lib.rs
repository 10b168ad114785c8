pub mod calendar;
pub mod capture;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod parser;
pub mod services;
pub mod views;

pub use calendar::MonthGrid;
pub use capture::{CaptureInput, EditInput};
pub use config::{AppConfig, ConfigOverrides};
pub use error::TaskError;
pub use gateway::{HttpGateway, MemoryGateway, TaskGateway};
pub use model::*;
pub use services::{StoreSnapshot, TaskStore};
pub use views::{Dashboard, StatusCounts};
