use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::Store;
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

const USER_COLUMNS: &str =
    "id, username, password_hash, email, first_name, last_name, profile_picture, created_at";
const CATEGORY_COLUMNS: &str = "id, user_id, name, icon, color, is_income";
const TRANSACTION_COLUMNS: &str = "id, user_id, category_id, amount, description, date, is_income";
const BUDGET_COLUMNS: &str = "id, user_id, category_id, amount, period, start_date, end_date";
const GOAL_COLUMNS: &str =
    "id, user_id, name, target_amount, current_amount, due_date, is_completed";
const REMINDER_COLUMNS: &str = "id, user_id, title, amount, due_date, is_recurring, frequency, \
                                category_id, notification_sent";
const SETTINGS_COLUMNS: &str =
    "id, user_id, theme, high_contrast, language, created_at, updated_at";
const CSV_COLUMNS: &str = "id, user_id, bank_name, column_mapping, skip_header, auto_categories";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    /// Connects the pool and applies the embedded migrations.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;
        Ok(Self { db })
    }
}

/// Escapes `%`, `_` and `\` so user input is matched literally by `ILIKE`.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl Store for PgStore {
    // ---- users ----

    async fn create_user(&self, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, password_hash, email, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(username) = lower($1)"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> anyhow::Result<Option<User>> {
        let saved = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET password_hash = $2, email = $3, first_name = $4, last_name = $5,
                   profile_picture = $6
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.profile_picture)
        .fetch_optional(&self.db)
        .await
        .context("update user")?;
        Ok(saved)
    }

    // ---- sessions ----

    async fn create_session(&self, user_id: Uuid, expires_at: OffsetDateTime) -> anyhow::Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, created_at, expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.db)
        .await
        .context("insert session")?;
        Ok(session)
    }

    async fn find_session(&self, id: Uuid) -> anyhow::Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, created_at, expires_at FROM sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find session")?;
        Ok(session)
    }

    async fn delete_session(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete session")?;
        Ok(())
    }

    // ---- settings ----

    async fn get_settings(&self, user_id: Uuid) -> anyhow::Result<Option<UserSettings>> {
        let settings = sqlx::query_as::<_, UserSettings>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM user_settings WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get user settings")?;
        Ok(settings)
    }

    async fn upsert_settings(&self, s: &UserSettings) -> anyhow::Result<UserSettings> {
        let settings = sqlx::query_as::<_, UserSettings>(&format!(
            r#"
            INSERT INTO user_settings (id, user_id, theme, high_contrast, language, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE
               SET theme = EXCLUDED.theme,
                   high_contrast = EXCLUDED.high_contrast,
                   language = EXCLUDED.language,
                   updated_at = EXCLUDED.updated_at
            RETURNING {SETTINGS_COLUMNS}
            "#
        ))
        .bind(s.id)
        .bind(s.user_id)
        .bind(&s.theme)
        .bind(s.high_contrast)
        .bind(&s.language)
        .bind(s.created_at)
        .bind(s.updated_at)
        .fetch_one(&self.db)
        .await
        .context("upsert user settings")?;
        Ok(settings)
    }

    // ---- categories ----

    async fn list_categories(&self, user_id: Uuid) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
              FROM categories
             WHERE user_id = $1 OR user_id IS NULL
             ORDER BY name, user_id NULLS LAST
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list categories")?;
        Ok(rows)
    }

    async fn get_category(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Category>> {
        let row = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
              FROM categories
             WHERE id = $1 AND (user_id = $2 OR user_id IS NULL)
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get category")?;
        Ok(row)
    }

    async fn create_category(&self, user_id: Uuid, new: NewCategory) -> anyhow::Result<Category> {
        let row = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (id, user_id, name, icon, color, is_income)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&new.name)
        .bind(&new.icon)
        .bind(&new.color)
        .bind(new.is_income)
        .fetch_one(&self.db)
        .await
        .context("insert category")?;
        Ok(row)
    }

    async fn save_category(&self, c: &Category) -> anyhow::Result<Option<Category>> {
        let Some(owner) = c.user_id else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
               SET name = $3, icon = $4, color = $5, is_income = $6
             WHERE id = $1 AND user_id = $2
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(c.id)
        .bind(owner)
        .bind(&c.name)
        .bind(&c.icon)
        .bind(&c.color)
        .bind(c.is_income)
        .fetch_optional(&self.db)
        .await
        .context("update category")?;
        Ok(row)
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete category")?;
        Ok(res.rows_affected() > 0)
    }

    // ---- transactions ----

    async fn list_transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> anyhow::Result<Vec<TransactionWithCategory>> {
        let rows = sqlx::query_as::<_, TransactionWithCategory>(
            r#"
            SELECT t.id, t.user_id, t.category_id, t.amount, t.description, t.date, t.is_income,
                   c.name AS category_name, c.color AS category_color, c.icon AS category_icon
              FROM transactions t
              LEFT JOIN categories c ON c.id = t.category_id
             WHERE t.user_id = $1
               AND ($2::date IS NULL OR t.date >= $2)
               AND ($3::date IS NULL OR t.date <= $3)
               AND ($4::uuid IS NULL OR t.category_id = $4)
               AND ($5::text IS NULL OR t.description ILIKE $5)
             ORDER BY t.date DESC
             LIMIT $6
            "#,
        )
        .bind(user_id)
        .bind(filter.from_date)
        .bind(filter.to_date)
        .bind(filter.category_id)
        .bind(filter.search.as_deref().map(like_pattern))
        .bind(filter.limit)
        .fetch_all(&self.db)
        .await
        .context("list transactions")?;
        Ok(rows)
    }

    async fn get_transaction(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get transaction")?;
        Ok(row)
    }

    async fn insert_transactions(
        &self,
        user_id: Uuid,
        rows: Vec<NewTransaction>,
    ) -> anyhow::Result<Vec<Transaction>> {
        let sql = format!(
            r#"
            INSERT INTO transactions (id, user_id, category_id, amount, description, date, is_income)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );
        let mut tx = self.db.begin().await.context("begin tx")?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let inserted = sqlx::query_as::<_, Transaction>(&sql)
                .bind(Uuid::new_v4())
                .bind(user_id)
                .bind(row.category_id)
                .bind(row.amount)
                .bind(&row.description)
                .bind(row.date)
                .bind(row.is_income)
                .fetch_one(&mut *tx)
                .await
                .context("insert transaction")?;
            out.push(inserted);
        }
        tx.commit().await.context("commit tx")?;
        Ok(out)
    }

    async fn save_transaction(&self, t: &Transaction) -> anyhow::Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            UPDATE transactions
               SET category_id = $3, amount = $4, description = $5, date = $6, is_income = $7
             WHERE id = $1 AND user_id = $2
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(t.id)
        .bind(t.user_id)
        .bind(t.category_id)
        .bind(t.amount)
        .bind(&t.description)
        .bind(t.date)
        .bind(t.is_income)
        .fetch_optional(&self.db)
        .await
        .context("update transaction")?;
        Ok(row)
    }

    async fn delete_transaction(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete transaction")?;
        Ok(res.rows_affected() > 0)
    }

    // ---- budgets ----

    async fn list_budgets(&self, user_id: Uuid) -> anyhow::Result<Vec<Budget>> {
        let rows = sqlx::query_as::<_, Budget>(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = $1 ORDER BY start_date DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list budgets")?;
        Ok(rows)
    }

    async fn get_budget(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Budget>> {
        let row = sqlx::query_as::<_, Budget>(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get budget")?;
        Ok(row)
    }

    async fn create_budget(&self, user_id: Uuid, new: NewBudget) -> anyhow::Result<Budget> {
        let row = sqlx::query_as::<_, Budget>(&format!(
            r#"
            INSERT INTO budgets (id, user_id, category_id, amount, period, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BUDGET_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(new.category_id)
        .bind(new.amount)
        .bind(&new.period)
        .bind(new.start_date)
        .bind(new.end_date)
        .fetch_one(&self.db)
        .await
        .context("insert budget")?;
        Ok(row)
    }

    async fn save_budget(&self, b: &Budget) -> anyhow::Result<Option<Budget>> {
        let row = sqlx::query_as::<_, Budget>(&format!(
            r#"
            UPDATE budgets
               SET category_id = $3, amount = $4, period = $5, start_date = $6, end_date = $7
             WHERE id = $1 AND user_id = $2
            RETURNING {BUDGET_COLUMNS}
            "#
        ))
        .bind(b.id)
        .bind(b.user_id)
        .bind(b.category_id)
        .bind(b.amount)
        .bind(&b.period)
        .bind(b.start_date)
        .bind(b.end_date)
        .fetch_optional(&self.db)
        .await
        .context("update budget")?;
        Ok(row)
    }

    async fn delete_budget(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM budgets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete budget")?;
        Ok(res.rows_affected() > 0)
    }

    // ---- goals ----

    async fn list_goals(&self, user_id: Uuid) -> anyhow::Result<Vec<Goal>> {
        let rows = sqlx::query_as::<_, Goal>(&format!(
            r#"
            SELECT {GOAL_COLUMNS}
              FROM goals
             WHERE user_id = $1
             ORDER BY due_date NULLS LAST, name
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list goals")?;
        Ok(rows)
    }

    async fn get_goal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Goal>> {
        let row = sqlx::query_as::<_, Goal>(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get goal")?;
        Ok(row)
    }

    async fn create_goal(&self, user_id: Uuid, new: NewGoal) -> anyhow::Result<Goal> {
        let row = sqlx::query_as::<_, Goal>(&format!(
            r#"
            INSERT INTO goals (id, user_id, name, target_amount, current_amount, due_date, is_completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {GOAL_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&new.name)
        .bind(new.target_amount)
        .bind(new.current_amount)
        .bind(new.due_date)
        .bind(new.is_completed)
        .fetch_one(&self.db)
        .await
        .context("insert goal")?;
        Ok(row)
    }

    async fn save_goal(&self, g: &Goal) -> anyhow::Result<Option<Goal>> {
        let row = sqlx::query_as::<_, Goal>(&format!(
            r#"
            UPDATE goals
               SET name = $3, target_amount = $4, current_amount = $5, due_date = $6,
                   is_completed = $7
             WHERE id = $1 AND user_id = $2
            RETURNING {GOAL_COLUMNS}
            "#
        ))
        .bind(g.id)
        .bind(g.user_id)
        .bind(&g.name)
        .bind(g.target_amount)
        .bind(g.current_amount)
        .bind(g.due_date)
        .bind(g.is_completed)
        .fetch_optional(&self.db)
        .await
        .context("update goal")?;
        Ok(row)
    }

    async fn delete_goal(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete goal")?;
        Ok(res.rows_affected() > 0)
    }

    // ---- reminders ----

    async fn list_reminders(&self, user_id: Uuid) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, Reminder>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE user_id = $1 ORDER BY due_date, title"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list reminders")?;
        Ok(rows)
    }

    async fn list_due_reminders(&self, user_id: Uuid, from: Date, to: Date) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, Reminder>(&format!(
            r#"
            SELECT {REMINDER_COLUMNS}
              FROM reminders
             WHERE user_id = $1 AND due_date >= $2 AND due_date <= $3
             ORDER BY due_date, title
            "#
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await
        .context("list due reminders")?;
        Ok(rows)
    }

    async fn users_with_pending_reminders(&self, from: Date, to: Date) -> anyhow::Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT user_id
              FROM reminders
             WHERE NOT notification_sent AND due_date >= $1 AND due_date <= $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await
        .context("list users with pending reminders")?;
        Ok(ids)
    }

    async fn get_reminder(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Reminder>> {
        let row = sqlx::query_as::<_, Reminder>(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get reminder")?;
        Ok(row)
    }

    async fn create_reminder(&self, user_id: Uuid, new: NewReminder) -> anyhow::Result<Reminder> {
        let row = sqlx::query_as::<_, Reminder>(&format!(
            r#"
            INSERT INTO reminders (id, user_id, title, amount, due_date, is_recurring, frequency, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {REMINDER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&new.title)
        .bind(new.amount)
        .bind(new.due_date)
        .bind(new.is_recurring)
        .bind(&new.frequency)
        .bind(new.category_id)
        .fetch_one(&self.db)
        .await
        .context("insert reminder")?;
        Ok(row)
    }

    async fn save_reminder(&self, r: &Reminder) -> anyhow::Result<Option<Reminder>> {
        let row = sqlx::query_as::<_, Reminder>(&format!(
            r#"
            UPDATE reminders
               SET title = $3, amount = $4, due_date = $5, is_recurring = $6, frequency = $7,
                   category_id = $8, notification_sent = $9
             WHERE id = $1 AND user_id = $2
            RETURNING {REMINDER_COLUMNS}
            "#
        ))
        .bind(r.id)
        .bind(r.user_id)
        .bind(&r.title)
        .bind(r.amount)
        .bind(r.due_date)
        .bind(r.is_recurring)
        .bind(&r.frequency)
        .bind(r.category_id)
        .bind(r.notification_sent)
        .fetch_optional(&self.db)
        .await
        .context("update reminder")?;
        Ok(row)
    }

    async fn delete_reminder(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete reminder")?;
        Ok(res.rows_affected() > 0)
    }

    async fn mark_reminders_notified(&self, user_id: Uuid, ids: &[Uuid]) -> anyhow::Result<u64> {
        let res = sqlx::query(
            "UPDATE reminders SET notification_sent = true WHERE user_id = $1 AND id = ANY($2)",
        )
        .bind(user_id)
        .bind(ids)
        .execute(&self.db)
        .await
        .context("mark reminders notified")?;
        Ok(res.rows_affected())
    }

    // ---- csv import settings ----

    async fn get_csv_settings(&self, user_id: Uuid) -> anyhow::Result<Option<CsvImportSetting>> {
        let row = sqlx::query_as::<_, CsvImportSetting>(&format!(
            "SELECT {CSV_COLUMNS} FROM csv_settings WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get csv settings")?;
        Ok(row)
    }

    async fn upsert_csv_settings(&self, s: &CsvImportSetting) -> anyhow::Result<CsvImportSetting> {
        let row = sqlx::query_as::<_, CsvImportSetting>(&format!(
            r#"
            INSERT INTO csv_settings (id, user_id, bank_name, column_mapping, skip_header, auto_categories)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE
               SET bank_name = EXCLUDED.bank_name,
                   column_mapping = EXCLUDED.column_mapping,
                   skip_header = EXCLUDED.skip_header,
                   auto_categories = EXCLUDED.auto_categories
            RETURNING {CSV_COLUMNS}
            "#
        ))
        .bind(s.id)
        .bind(s.user_id)
        .bind(&s.bank_name)
        .bind(s.column_mapping.clone())
        .bind(s.skip_header)
        .bind(s.auto_categories.clone())
        .fetch_one(&self.db)
        .await
        .context("upsert csv settings")?;
        Ok(row)
    }
}
