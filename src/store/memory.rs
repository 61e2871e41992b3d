use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use crate::models::{AuthUser, Budget, Expense, NewUser, User};

use super::{BudgetStore, ExpenseStore, StoreError, UserStore};

/// In-memory store backing the integration test harness and local demos.
/// `poison` flips every subsequent call into a store failure so the guards'
/// 500 paths can be exercised.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    budgets: Mutex<Vec<Budget>>,
    expenses: Mutex<Vec<Expense>>,
    next_id: AtomicI64,
    poisoned: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    pub fn poison(&self) {
        self.poisoned.store(true, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.poisoned.store(false, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.poisoned.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection refused".to_string()));
        }
        Ok(())
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_auth_user(&self, id: i64) -> Result<Option<AuthUser>, StoreError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).map(|u| AuthUser {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
        }))
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| u.token.as_deref() == Some(token))
            .cloned())
    }

    async fn create(&self, draft: NewUser) -> Result<User, StoreError> {
        self.check()?;
        let now = Utc::now();
        let user = User {
            id: self.next_id(),
            name: draft.name,
            email: draft.email,
            password: draft.password,
            confirmed: false,
            token: Some(draft.token),
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn confirm(&self, id: i64) -> Result<(), StoreError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.confirmed = true;
            user.token = None;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_token(&self, id: i64, token: &str) -> Result<(), StoreError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.token = Some(token.to_string());
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn reset_password(&self, id: i64, password_hash: &str) -> Result<(), StoreError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.password = password_hash.to_string();
            user.token = None;
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl BudgetStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Budget>, StoreError> {
        self.check()?;
        let budgets = self.budgets.lock().unwrap();
        Ok(budgets.iter().find(|b| b.id == id).cloned())
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Budget>, StoreError> {
        self.check()?;
        let budgets = self.budgets.lock().unwrap();
        let mut owned: Vec<Budget> = budgets
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn create(
        &self,
        user_id: i64,
        name: &str,
        amount: Decimal,
    ) -> Result<Budget, StoreError> {
        self.check()?;
        let now = Utc::now();
        let budget = Budget {
            id: self.next_id(),
            name: name.to_string(),
            amount,
            user_id,
            created_at: now,
            updated_at: now,
        };
        self.budgets.lock().unwrap().push(budget.clone());
        Ok(budget)
    }

    async fn update(&self, id: i64, name: &str, amount: Decimal) -> Result<(), StoreError> {
        self.check()?;
        let mut budgets = self.budgets.lock().unwrap();
        if let Some(budget) = budgets.iter_mut().find(|b| b.id == id) {
            budget.name = name.to_string();
            budget.amount = amount;
            budget.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.check()?;
        self.budgets.lock().unwrap().retain(|b| b.id != id);
        // Cascade, mirroring the ON DELETE CASCADE constraint
        self.expenses.lock().unwrap().retain(|e| e.budget_id != id);
        Ok(())
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Expense>, StoreError> {
        self.check()?;
        let expenses = self.expenses.lock().unwrap();
        Ok(expenses.iter().find(|e| e.id == id).cloned())
    }

    async fn list_by_budget(&self, budget_id: i64) -> Result<Vec<Expense>, StoreError> {
        self.check()?;
        let expenses = self.expenses.lock().unwrap();
        let mut owned: Vec<Expense> = expenses
            .iter()
            .filter(|e| e.budget_id == budget_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn create(
        &self,
        budget_id: i64,
        name: &str,
        amount: Decimal,
    ) -> Result<Expense, StoreError> {
        self.check()?;
        let now = Utc::now();
        let expense = Expense {
            id: self.next_id(),
            name: name.to_string(),
            amount,
            budget_id,
            created_at: now,
            updated_at: now,
        };
        self.expenses.lock().unwrap().push(expense.clone());
        Ok(expense)
    }

    async fn update(&self, id: i64, name: &str, amount: Decimal) -> Result<(), StoreError> {
        self.check()?;
        let mut expenses = self.expenses.lock().unwrap();
        if let Some(expense) = expenses.iter_mut().find(|e| e.id == id) {
            expense.name = name.to_string();
            expense.amount = amount;
            expense.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.check()?;
        self.expenses.lock().unwrap().retain(|e| e.id != id);
        Ok(())
    }
}
