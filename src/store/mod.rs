pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{AuthUser, Budget, Expense, NewUser, User};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Infrastructure failure in the persistence collaborator. Guards convert
/// these into the HTTP error taxonomy; the raw cause is only logged.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Projection lookup used by the authentication guard; never exposes the
    /// password hash.
    async fn find_auth_user(&self, id: i64) -> Result<Option<AuthUser>, StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, StoreError>;

    async fn create(&self, draft: NewUser) -> Result<User, StoreError>;

    /// Marks the account confirmed and clears the one-shot token.
    async fn confirm(&self, id: i64) -> Result<(), StoreError>;

    /// Installs a fresh one-shot token for a password reset request.
    async fn set_token(&self, id: i64, token: &str) -> Result<(), StoreError>;

    /// Replaces the password hash and clears the one-shot token.
    async fn reset_password(&self, id: i64, password_hash: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait BudgetStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Budget>, StoreError>;

    /// Budgets owned by the user, newest first.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Budget>, StoreError>;

    async fn create(&self, user_id: i64, name: &str, amount: Decimal)
        -> Result<Budget, StoreError>;

    async fn update(&self, id: i64, name: &str, amount: Decimal) -> Result<(), StoreError>;

    /// Deletes the budget and, transitively, its expenses.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Expense>, StoreError>;

    async fn list_by_budget(&self, budget_id: i64) -> Result<Vec<Expense>, StoreError>;

    async fn create(
        &self,
        budget_id: i64,
        name: &str,
        amount: Decimal,
    ) -> Result<Expense, StoreError>;

    async fn update(&self, id: i64, name: &str, amount: Decimal) -> Result<(), StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}
