//! GUIモジュール - eframe/egui によるデスクトップ画面

mod app;
mod theme;

pub use app::{ConsigneeRenamerApp, run};
