pub mod clock;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod storage;
pub mod task_api;
pub mod timestamp;
pub mod view;

pub use task_api::TaskRepository;
