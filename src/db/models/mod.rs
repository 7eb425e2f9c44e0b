//! Database Models

// Serde helpers
pub mod serde_helpers;

// Redemption codes
pub mod redemption_code;

// Orders
pub mod order;

// Loyalty
pub mod loyalty;

// Re-exports
pub use redemption_code::{CodeIssue, CodeState, CodeValidate, CodeValidation, CupSize, RedemptionCode};
pub use order::{
    FlavorSelection, Order, OrderCreate, OrderStatus, OrderStatusUpdate,
    PaymentStatus, PlacedOrder, Pricing, StatusTimestamps, ToppingSelection,
};
pub use loyalty::LoyaltyAccount;
