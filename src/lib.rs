// Library surface for the controller binary and the integration tests.
// Everything hardware-specific sits behind the traits in `hardware`.
pub mod app_dirs;
pub mod board;
pub mod climate;
pub mod config;
pub mod error;
pub mod hardware;
pub mod input;
pub mod light;
pub mod menu;
pub mod motion;
pub mod records;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod util;
