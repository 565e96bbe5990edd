//! The components module contains all UI components of the card.

mod app;
mod card;
mod card_menu;
mod file_list;
mod icons;
mod player_select;
mod seek_controls;

pub use app::*;
pub use card::*;
pub use card_menu::*;
pub use file_list::*;
pub use icons::*;
pub use player_select::*;
pub use seek_controls::*;
