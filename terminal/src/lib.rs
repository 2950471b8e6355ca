pub mod app;
pub mod render;
pub mod storage;
pub mod sync;
pub mod views;
