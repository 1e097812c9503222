use anyhow::bail;
use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::{
    auth::repo_types::{NewUser, Session, User},
    budgets::repo_types::{Budget, NewBudget},
    categories::repo_types::{Category, NewCategory, DEFAULT_CATEGORIES},
    goals::repo_types::{Goal, NewGoal},
    import::repo_types::CsvImportSetting,
    reminders::repo_types::{NewReminder, Reminder},
    transactions::repo_types::{NewTransaction, Transaction, TransactionFilter, TransactionWithCategory},
    users::repo_types::UserSettings,
};

/// Id of the `n`th shared category, matching the ids seeded by the SQL migration.
pub fn default_category_id(n: usize) -> Uuid {
    Uuid::from_u128(0x4000_8000_0000_0000_0000 | (n as u128 + 1))
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    sessions: Vec<Session>,
    settings: Vec<UserSettings>,
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    goals: Vec<Goal>,
    reminders: Vec<Reminder>,
    csv_settings: Vec<CsvImportSetting>,
}

/// In-process store. Data lives for the lifetime of the process.
pub struct MemStore {
    tables: RwLock<Tables>,
}

impl MemStore {
    pub fn new() -> Self {
        let categories = DEFAULT_CATEGORIES
            .iter()
            .enumerate()
            .map(|(n, (name, icon, color, is_income))| Category {
                id: default_category_id(n),
                user_id: None,
                name: (*name).into(),
                icon: (*icon).into(),
                color: (*color).into(),
                is_income: *is_income,
            })
            .collect();
        Self {
            tables: RwLock::new(Tables {
                categories,
                ..Tables::default()
            }),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Replaces the row matched by `same` with `row`, returning the stored copy.
fn replace<T: Clone>(rows: &mut [T], row: &T, same: impl Fn(&T) -> bool) -> Option<T> {
    let slot = rows.iter_mut().find(|r| same(r))?;
    *slot = row.clone();
    Some(row.clone())
}

/// Removes the rows matched by `same`, reporting whether any existed.
fn remove<T>(rows: &mut Vec<T>, same: impl Fn(&T) -> bool) -> bool {
    let before = rows.len();
    rows.retain(|r| !same(r));
    rows.len() != before
}

#[async_trait]
impl Store for MemStore {
    // ---- users ----

    async fn create_user(&self, new: NewUser) -> anyhow::Result<User> {
        let mut t = self.tables.write().await;
        let lowered = new.username.to_lowercase();
        if t.users.iter().any(|u| u.username.to_lowercase() == lowered) {
            bail!("duplicate username {}", new.username);
        }
        if t.users.iter().any(|u| u.email == new.email) {
            bail!("duplicate email {}", new.email);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            password_hash: new.password_hash,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            profile_picture: None,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        let lowered = username.to_lowercase();
        Ok(t.users
            .iter()
            .find(|u| u.username.to_lowercase() == lowered)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn save_user(&self, user: &User) -> anyhow::Result<Option<User>> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.id != user.id && u.email == user.email) {
            bail!("duplicate email {}", user.email);
        }
        Ok(replace(&mut t.users, user, |u| u.id == user.id))
    }

    // ---- sessions ----

    async fn create_session(&self, user_id: Uuid, expires_at: OffsetDateTime) -> anyhow::Result<Session> {
        let mut t = self.tables.write().await;
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            created_at: OffsetDateTime::now_utc(),
            expires_at,
        };
        t.sessions.push(session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: Uuid) -> anyhow::Result<Option<Session>> {
        let t = self.tables.read().await;
        Ok(t.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn delete_session(&self, id: Uuid) -> anyhow::Result<()> {
        let mut t = self.tables.write().await;
        remove(&mut t.sessions, |s| s.id == id);
        Ok(())
    }

    // ---- settings ----

    async fn get_settings(&self, user_id: Uuid) -> anyhow::Result<Option<UserSettings>> {
        let t = self.tables.read().await;
        Ok(t.settings.iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn upsert_settings(&self, settings: &UserSettings) -> anyhow::Result<UserSettings> {
        let mut t = self.tables.write().await;
        match t.settings.iter_mut().find(|s| s.user_id == settings.user_id) {
            Some(existing) => {
                existing.theme = settings.theme.clone();
                existing.high_contrast = settings.high_contrast;
                existing.language = settings.language.clone();
                existing.updated_at = settings.updated_at;
                Ok(existing.clone())
            }
            None => {
                t.settings.push(settings.clone());
                Ok(settings.clone())
            }
        }
    }

    // ---- categories ----

    async fn list_categories(&self, user_id: Uuid) -> anyhow::Result<Vec<Category>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Category> = t
            .categories
            .iter()
            .filter(|c| c.user_id.is_none() || c.is_owned_by(user_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then(a.user_id.is_none().cmp(&b.user_id.is_none()))
        });
        Ok(rows)
    }

    async fn get_category(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Category>> {
        let t = self.tables.read().await;
        Ok(t.categories
            .iter()
            .find(|c| c.id == id && (c.user_id.is_none() || c.is_owned_by(user_id)))
            .cloned())
    }

    async fn create_category(&self, user_id: Uuid, new: NewCategory) -> anyhow::Result<Category> {
        let mut t = self.tables.write().await;
        let category = Category {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            name: new.name,
            icon: new.icon,
            color: new.color,
            is_income: new.is_income,
        };
        t.categories.push(category.clone());
        Ok(category)
    }

    async fn save_category(&self, category: &Category) -> anyhow::Result<Option<Category>> {
        let Some(owner) = category.user_id else {
            return Ok(None);
        };
        let mut t = self.tables.write().await;
        Ok(replace(&mut t.categories, category, |c| {
            c.id == category.id && c.is_owned_by(owner)
        }))
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        if !remove(&mut t.categories, |c| c.id == id && c.is_owned_by(user_id)) {
            return Ok(false);
        }
        let gone = Some(id);
        for tx in t.transactions.iter_mut().filter(|r| r.category_id == gone) {
            tx.category_id = None;
        }
        for b in t.budgets.iter_mut().filter(|r| r.category_id == gone) {
            b.category_id = None;
        }
        for r in t.reminders.iter_mut().filter(|r| r.category_id == gone) {
            r.category_id = None;
        }
        Ok(true)
    }

    // ---- transactions ----

    async fn list_transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> anyhow::Result<Vec<TransactionWithCategory>> {
        let t = self.tables.read().await;
        let mut rows: Vec<&Transaction> = t
            .transactions
            .iter()
            .filter(|tx| tx.user_id == user_id && filter.matches(tx))
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = filter.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(rows
            .into_iter()
            .map(|tx| {
                let category = tx
                    .category_id
                    .and_then(|id| t.categories.iter().find(|c| c.id == id));
                TransactionWithCategory {
                    transaction: tx.clone(),
                    category_name: category.map(|c| c.name.clone()),
                    category_color: category.map(|c| c.color.clone()),
                    category_icon: category.map(|c| c.icon.clone()),
                }
            })
            .collect())
    }

    async fn get_transaction(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Transaction>> {
        let t = self.tables.read().await;
        Ok(t.transactions
            .iter()
            .find(|tx| tx.id == id && tx.user_id == user_id)
            .cloned())
    }

    async fn insert_transactions(
        &self,
        user_id: Uuid,
        rows: Vec<NewTransaction>,
    ) -> anyhow::Result<Vec<Transaction>> {
        let mut t = self.tables.write().await;
        let inserted: Vec<Transaction> = rows
            .into_iter()
            .map(|row| Transaction {
                id: Uuid::new_v4(),
                user_id,
                category_id: row.category_id,
                amount: row.amount,
                description: row.description,
                date: row.date,
                is_income: row.is_income,
            })
            .collect();
        t.transactions.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn save_transaction(&self, tx: &Transaction) -> anyhow::Result<Option<Transaction>> {
        let mut t = self.tables.write().await;
        Ok(replace(&mut t.transactions, tx, |r| {
            r.id == tx.id && r.user_id == tx.user_id
        }))
    }

    async fn delete_transaction(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        Ok(remove(&mut t.transactions, |r| r.id == id && r.user_id == user_id))
    }

    // ---- budgets ----

    async fn list_budgets(&self, user_id: Uuid) -> anyhow::Result<Vec<Budget>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Budget> = t
            .budgets
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(rows)
    }

    async fn get_budget(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Budget>> {
        let t = self.tables.read().await;
        Ok(t.budgets
            .iter()
            .find(|b| b.id == id && b.user_id == user_id)
            .cloned())
    }

    async fn create_budget(&self, user_id: Uuid, new: NewBudget) -> anyhow::Result<Budget> {
        let mut t = self.tables.write().await;
        let budget = Budget {
            id: Uuid::new_v4(),
            user_id,
            category_id: new.category_id,
            amount: new.amount,
            period: new.period,
            start_date: new.start_date,
            end_date: new.end_date,
        };
        t.budgets.push(budget.clone());
        Ok(budget)
    }

    async fn save_budget(&self, budget: &Budget) -> anyhow::Result<Option<Budget>> {
        let mut t = self.tables.write().await;
        Ok(replace(&mut t.budgets, budget, |b| {
            b.id == budget.id && b.user_id == budget.user_id
        }))
    }

    async fn delete_budget(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        Ok(remove(&mut t.budgets, |b| b.id == id && b.user_id == user_id))
    }

    // ---- goals ----

    async fn list_goals(&self, user_id: Uuid) -> anyhow::Result<Vec<Goal>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Goal> = t
            .goals
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (a.due_date.is_none(), a.due_date, &a.name).cmp(&(b.due_date.is_none(), b.due_date, &b.name))
        });
        Ok(rows)
    }

    async fn get_goal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Goal>> {
        let t = self.tables.read().await;
        Ok(t.goals
            .iter()
            .find(|g| g.id == id && g.user_id == user_id)
            .cloned())
    }

    async fn create_goal(&self, user_id: Uuid, new: NewGoal) -> anyhow::Result<Goal> {
        let mut t = self.tables.write().await;
        let goal = Goal {
            id: Uuid::new_v4(),
            user_id,
            name: new.name,
            target_amount: new.target_amount,
            current_amount: new.current_amount,
            due_date: new.due_date,
            is_completed: new.is_completed,
        };
        t.goals.push(goal.clone());
        Ok(goal)
    }

    async fn save_goal(&self, goal: &Goal) -> anyhow::Result<Option<Goal>> {
        let mut t = self.tables.write().await;
        Ok(replace(&mut t.goals, goal, |g| {
            g.id == goal.id && g.user_id == goal.user_id
        }))
    }

    async fn delete_goal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        Ok(remove(&mut t.goals, |g| g.id == id && g.user_id == user_id))
    }

    // ---- reminders ----

    async fn list_reminders(&self, user_id: Uuid) -> anyhow::Result<Vec<Reminder>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Reminder> = t
            .reminders
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.due_date, &a.title).cmp(&(b.due_date, &b.title)));
        Ok(rows)
    }

    async fn list_due_reminders(&self, user_id: Uuid, from: Date, to: Date) -> anyhow::Result<Vec<Reminder>> {
        let mut rows = self.list_reminders(user_id).await?;
        rows.retain(|r| r.due_date >= from && r.due_date <= to);
        Ok(rows)
    }

    async fn users_with_pending_reminders(&self, from: Date, to: Date) -> anyhow::Result<Vec<Uuid>> {
        let t = self.tables.read().await;
        let mut ids: Vec<Uuid> = t
            .reminders
            .iter()
            .filter(|r| !r.notification_sent && r.due_date >= from && r.due_date <= to)
            .map(|r| r.user_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn get_reminder(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Reminder>> {
        let t = self.tables.read().await;
        Ok(t.reminders
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn create_reminder(&self, user_id: Uuid, new: NewReminder) -> anyhow::Result<Reminder> {
        let mut t = self.tables.write().await;
        let reminder = Reminder {
            id: Uuid::new_v4(),
            user_id,
            title: new.title,
            amount: new.amount,
            due_date: new.due_date,
            is_recurring: new.is_recurring,
            frequency: new.frequency,
            category_id: new.category_id,
            notification_sent: false,
        };
        t.reminders.push(reminder.clone());
        Ok(reminder)
    }

    async fn save_reminder(&self, reminder: &Reminder) -> anyhow::Result<Option<Reminder>> {
        let mut t = self.tables.write().await;
        Ok(replace(&mut t.reminders, reminder, |r| {
            r.id == reminder.id && r.user_id == reminder.user_id
        }))
    }

    async fn delete_reminder(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut t = self.tables.write().await;
        Ok(remove(&mut t.reminders, |r| r.id == id && r.user_id == user_id))
    }

    async fn mark_reminders_notified(&self, user_id: Uuid, ids: &[Uuid]) -> anyhow::Result<u64> {
        let mut t = self.tables.write().await;
        let mut marked = 0;
        for r in t
            .reminders
            .iter_mut()
            .filter(|r| r.user_id == user_id && ids.contains(&r.id))
        {
            r.notification_sent = true;
            marked += 1;
        }
        Ok(marked)
    }

    // ---- csv import settings ----

    async fn get_csv_settings(&self, user_id: Uuid) -> anyhow::Result<Option<CsvImportSetting>> {
        let t = self.tables.read().await;
        Ok(t.csv_settings.iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn upsert_csv_settings(&self, setting: &CsvImportSetting) -> anyhow::Result<CsvImportSetting> {
        let mut t = self.tables.write().await;
        match t.csv_settings.iter_mut().find(|s| s.user_id == setting.user_id) {
            Some(existing) => {
                let id = existing.id;
                *existing = CsvImportSetting {
                    id,
                    ..setting.clone()
                };
                Ok(existing.clone())
            }
            None => {
                t.csv_settings.push(setting.clone());
                Ok(setting.clone())
            }
        }
    }
}
