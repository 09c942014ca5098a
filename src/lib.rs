//! Install dialog for a Wine-aware game launcher.
//!
//! [`core`] holds the dialog state, its loaders and the install dispatcher
//! behind injectable service traits; [`ui`] renders it with GTK.

pub mod core;
pub mod logging;
#[cfg(feature = "gui")]
pub mod ui;
