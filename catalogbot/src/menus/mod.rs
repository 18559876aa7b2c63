pub mod catalog_menu;
pub mod common;
pub mod navigation;
