//! Inline menus: main menu, categories, product detail, cart, checkout

pub mod callback_router;
pub mod cart_view;
pub mod categories;
pub mod checkout;
pub mod main_menu;
pub mod orders;
pub mod product;

pub use callback_router::handle_menu_callback;
pub use main_menu::show_main_menu;
