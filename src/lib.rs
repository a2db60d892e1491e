//! Preview uploaded images at a catalog of CDN resize targets and export the
//! chosen sizes as a zip archive or a CSV of resize URLs.

#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub mod bridge;
pub mod catalog;
pub mod config;
pub mod delivery;
pub mod error;
pub mod export;
pub mod format;
mod preview;
pub mod registry;
pub mod save;
pub mod selection;
pub mod task;
pub mod uploader;

pub use app::ResizerApp;

#[cfg(not(target_arch = "wasm32"))]
impl ResizerApp {
    /// Run the app natively with the provided `NativeOptions`.
    pub fn run(options: eframe::NativeOptions) -> Result<(), eframe::Error> {
        eframe::run_native(
            "resize_exporter",
            options,
            Box::new(|cc| Ok(Box::new(Self::new(cc)))),
        )
    }
}
