//! Pure domain state and arithmetic, free of I/O.

pub mod cart;
pub mod events;
pub mod promo;
pub mod wishlist;
