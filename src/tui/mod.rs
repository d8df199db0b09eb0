pub mod app;
pub mod event;
pub mod form;
pub mod input;
pub mod list;
pub mod render;
pub mod scheduler;
pub mod theme;
pub mod viewport;

pub use app::run;
