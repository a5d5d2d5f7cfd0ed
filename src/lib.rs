//! Storefront cart/wishlist synchronization core
//!
//! Reconciles anonymous (locally persisted) shopping state with a
//! server-backed copy across authentication transitions.
//!
//! ## Features
//! - Cart with promo/coupon application and derived totals
//! - Wishlist with move-to-cart helpers
//! - Per-call routing between local and remote persistence by auth state
//! - Uniform session-expiry handling across every remote mutation
//! - Durable local persistence for anonymous sessions

pub mod api;
pub mod auth;
pub mod domain;
pub mod error;
pub mod storage;
pub mod store;

pub use api::{CartApi, CartPayload, CouponOutcome, HttpApi, WishlistApi, WishlistPayload};
pub use auth::AuthSession;
pub use domain::cart::{CartItem, CartState, CartSummary, ProductSnapshot, PLACEHOLDER_IMAGE};
pub use domain::events::{NoticeKind, StoreEvent};
pub use domain::promo::{AppliedPromo, CartTotals};
pub use domain::wishlist::{WishlistItem, WishlistState};
pub use error::StoreError;
pub use storage::{JsonFileStore, LocalStore, MemoryStore};
pub use store::{watch_auth, AuthAware, CartStore, MoveReport, WishlistStore};

pub type Result<T> = std::result::Result<T, StoreError>;
