//! Persistence seam.
//!
//! Every data access goes through [`Store`]. Rows owned by a user are always
//! addressed together with that user's id, so a handler can never read or
//! mutate another user's data by guessing an id.

mod memory;
mod postgres;

pub use memory::{default_category_id, MemStore};
pub use postgres::PgStore;

use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, Session, User},
    budgets::repo_types::{Budget, NewBudget},
    categories::repo_types::{Category, NewCategory},
    goals::repo_types::{Goal, NewGoal},
    import::repo_types::CsvImportSetting,
    reminders::repo_types::{NewReminder, Reminder},
    transactions::repo_types::{NewTransaction, Transaction, TransactionFilter, TransactionWithCategory},
    users::repo_types::UserSettings,
};

#[async_trait]
pub trait Store: Send + Sync {
    // ---- users ----
    async fn create_user(&self, new: NewUser) -> anyhow::Result<User>;
    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Case-insensitive lookup.
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// Persists every mutable column of `user`.
    async fn save_user(&self, user: &User) -> anyhow::Result<Option<User>>;

    // ---- sessions ----
    async fn create_session(&self, user_id: Uuid, expires_at: OffsetDateTime) -> anyhow::Result<Session>;
    async fn find_session(&self, id: Uuid) -> anyhow::Result<Option<Session>>;
    async fn delete_session(&self, id: Uuid) -> anyhow::Result<()>;

    // ---- settings ----
    async fn get_settings(&self, user_id: Uuid) -> anyhow::Result<Option<UserSettings>>;
    /// Inserts `settings`, or replaces the user's existing row.
    async fn upsert_settings(&self, settings: &UserSettings) -> anyhow::Result<UserSettings>;

    // ---- categories ----
    /// The user's own categories plus the shared defaults.
    async fn list_categories(&self, user_id: Uuid) -> anyhow::Result<Vec<Category>>;
    /// A category visible to the user (own or shared).
    async fn get_category(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Category>>;
    async fn create_category(&self, user_id: Uuid, new: NewCategory) -> anyhow::Result<Category>;
    /// Only the user's own categories can be saved.
    async fn save_category(&self, category: &Category) -> anyhow::Result<Option<Category>>;
    /// Deletes one of the user's own categories; references become null.
    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;

    // ---- transactions ----
    /// Newest date first, joined with category display fields.
    async fn list_transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> anyhow::Result<Vec<TransactionWithCategory>>;
    async fn get_transaction(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Transaction>>;
    /// Inserts all rows atomically, returning them in input order.
    async fn insert_transactions(
        &self,
        user_id: Uuid,
        rows: Vec<NewTransaction>,
    ) -> anyhow::Result<Vec<Transaction>>;
    async fn save_transaction(&self, tx: &Transaction) -> anyhow::Result<Option<Transaction>>;
    async fn delete_transaction(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;

    // ---- budgets ----
    async fn list_budgets(&self, user_id: Uuid) -> anyhow::Result<Vec<Budget>>;
    async fn get_budget(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Budget>>;
    async fn create_budget(&self, user_id: Uuid, new: NewBudget) -> anyhow::Result<Budget>;
    async fn save_budget(&self, budget: &Budget) -> anyhow::Result<Option<Budget>>;
    async fn delete_budget(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;

    // ---- goals ----
    async fn list_goals(&self, user_id: Uuid) -> anyhow::Result<Vec<Goal>>;
    async fn get_goal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Goal>>;
    async fn create_goal(&self, user_id: Uuid, new: NewGoal) -> anyhow::Result<Goal>;
    async fn save_goal(&self, goal: &Goal) -> anyhow::Result<Option<Goal>>;
    async fn delete_goal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;

    // ---- reminders ----
    /// Ordered by due date.
    async fn list_reminders(&self, user_id: Uuid) -> anyhow::Result<Vec<Reminder>>;
    /// Reminders with `from <= due_date <= to`, ordered by due date.
    async fn list_due_reminders(&self, user_id: Uuid, from: Date, to: Date) -> anyhow::Result<Vec<Reminder>>;
    /// Users owning at least one unsent reminder due in `from..=to`.
    async fn users_with_pending_reminders(&self, from: Date, to: Date) -> anyhow::Result<Vec<Uuid>>;
    async fn get_reminder(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Reminder>>;
    async fn create_reminder(&self, user_id: Uuid, new: NewReminder) -> anyhow::Result<Reminder>;
    async fn save_reminder(&self, reminder: &Reminder) -> anyhow::Result<Option<Reminder>>;
    async fn delete_reminder(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
    async fn mark_reminders_notified(&self, user_id: Uuid, ids: &[Uuid]) -> anyhow::Result<u64>;

    // ---- csv import settings ----
    async fn get_csv_settings(&self, user_id: Uuid) -> anyhow::Result<Option<CsvImportSetting>>;
    /// Inserts `setting`, or replaces the user's existing row.
    async fn upsert_csv_settings(&self, setting: &CsvImportSetting) -> anyhow::Result<CsvImportSetting>;
}
