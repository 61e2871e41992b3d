use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::config;
use crate::models::{AuthUser, Budget, Expense, NewUser, User};

use super::{BudgetStore, ExpenseStore, StoreError, UserStore};

/// sqlx-backed store shared by the three resource traits.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the configured database settings.
    pub async fn connect() -> Result<Self, StoreError> {
        let db = &config::config().database;
        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .acquire_timeout(Duration::from_secs(db.connection_timeout_secs))
            .connect(&db.url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the schema when it does not exist yet. Expense rows cascade on
    /// budget deletion so no expense stays reachable via a stale budget id.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                confirmed BOOLEAN NOT NULL DEFAULT FALSE,
                token VARCHAR(6),
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS budgets (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                amount NUMERIC(12, 2) NOT NULL,
                user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS expenses (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                amount NUMERIC(12, 2) NOT NULL,
                budget_id BIGINT NOT NULL REFERENCES budgets(id) ON DELETE CASCADE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, confirmed, token, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_auth_user(&self, id: i64) -> Result<Option<AuthUser>, StoreError> {
        let user =
            sqlx::query_as::<_, AuthUser>("SELECT id, name, email FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, confirmed, token, created_at, updated_at
             FROM users WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, draft: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password, token)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, email, password, confirmed, token, created_at, updated_at",
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.password)
        .bind(&draft.token)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn confirm(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE users SET confirmed = TRUE, token = NULL, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_token(&self, id: i64, token: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET token = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn reset_password(&self, id: i64, password_hash: &str) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE users SET password = $2, token = NULL, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl BudgetStore for PostgresStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Budget>, StoreError> {
        let budget = sqlx::query_as::<_, Budget>(
            "SELECT id, name, amount, user_id, created_at, updated_at
             FROM budgets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(budget)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Budget>, StoreError> {
        let budgets = sqlx::query_as::<_, Budget>(
            "SELECT id, name, amount, user_id, created_at, updated_at
             FROM budgets WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(budgets)
    }

    async fn create(
        &self,
        user_id: i64,
        name: &str,
        amount: Decimal,
    ) -> Result<Budget, StoreError> {
        let budget = sqlx::query_as::<_, Budget>(
            "INSERT INTO budgets (name, amount, user_id)
             VALUES ($1, $2, $3)
             RETURNING id, name, amount, user_id, created_at, updated_at",
        )
        .bind(name)
        .bind(amount)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(budget)
    }

    async fn update(&self, id: i64, name: &str, amount: Decimal) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE budgets SET name = $2, amount = $3, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(name)
        .bind(amount)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM budgets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ExpenseStore for PostgresStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Expense>, StoreError> {
        let expense = sqlx::query_as::<_, Expense>(
            "SELECT id, name, amount, budget_id, created_at, updated_at
             FROM expenses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    async fn list_by_budget(&self, budget_id: i64) -> Result<Vec<Expense>, StoreError> {
        let expenses = sqlx::query_as::<_, Expense>(
            "SELECT id, name, amount, budget_id, created_at, updated_at
             FROM expenses WHERE budget_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(budget_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    async fn create(
        &self,
        budget_id: i64,
        name: &str,
        amount: Decimal,
    ) -> Result<Expense, StoreError> {
        let expense = sqlx::query_as::<_, Expense>(
            "INSERT INTO expenses (name, amount, budget_id)
             VALUES ($1, $2, $3)
             RETURNING id, name, amount, budget_id, created_at, updated_at",
        )
        .bind(name)
        .bind(amount)
        .bind(budget_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(expense)
    }

    async fn update(&self, id: i64, name: &str, amount: Decimal) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE expenses SET name = $2, amount = $3, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(name)
        .bind(amount)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
