pub mod backend;
pub mod dialog;
pub mod dispatch;
pub mod format;
pub mod language;
pub mod loader;
pub mod model;
pub mod paths;
pub mod selective;
pub mod services;
