//! Terminal front end: session loop, effect execution, rendering,
//! preferences and logging.
pub mod app;
pub mod effects;
pub mod logging;
pub mod persistence;
pub mod ui;
