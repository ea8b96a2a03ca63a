pub mod event;
pub mod window;
