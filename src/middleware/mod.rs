//! Request guard chain.
//!
//! Every protected request flows through a fixed pipeline of guards, each of
//! which either attaches typed context to the request and calls the next
//! stage, or terminates the request with an error response:
//!
//! authenticate → validate_budget_id → validate_budget_exists → has_access
//!   → [validate_expense_id → validate_expense_exists → belongs_to_budget]
//!   → handler
//!
//! A guard's only precondition is that every earlier guard in this order has
//! succeeded; a guard that finds its predecessor's context missing fails
//! closed rather than proceeding with an undefined actor or resource.

pub mod auth;
pub mod budget;
pub mod expense;

pub use auth::authenticate;
pub use budget::{has_access, validate_budget_exists, validate_budget_id};
pub use expense::{belongs_to_budget, validate_expense_exists, validate_expense_id};
