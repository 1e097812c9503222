//! Bill reminder digests.
//!
//! Unsent reminders due within [`NOTIFY_WINDOW_DAYS`] are grouped per user,
//! handed to a [`Notifier`] and then flagged so they go out only once.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use time::{macros::format_description, Date, Duration};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::repo_types::Reminder;
use crate::{auth::repo_types::User, calendar::today, state::AppState};

pub const NOTIFY_WINDOW_DAYS: i64 = 3;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_digest(&self, user: &User, reminders: &[Reminder]) -> anyhow::Result<()>;
}

/// Writes the digest to the log instead of mailing it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_digest(&self, user: &User, reminders: &[Reminder]) -> anyhow::Result<()> {
        info!(
            to = %user.email,
            subject = "BudgetWise: Upcoming Bill Reminders",
            count = reminders.len(),
            bills = %digest_lines(reminders).join("; "),
            "bill reminder digest for {}",
            user.first_name
        );
        Ok(())
    }
}

/// `- Rent: 1200.00 due on March 5, 2024`
pub fn digest_lines(reminders: &[Reminder]) -> Vec<String> {
    reminders
        .iter()
        .map(|r| {
            let amount = r
                .amount
                .map(|a| format!("{a:.2}"))
                .unwrap_or_else(|| "N/A".to_string());
            format!("- {}: {} due on {}", r.title, amount, long_date(r.due_date))
        })
        .collect()
}

fn long_date(date: Date) -> String {
    date.format(format_description!("[month repr:long] [day padding:none], [year]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Sends one user's pending digest. Returns how many reminders went out.
pub async fn notify_user(state: &AppState, user_id: Uuid, today: Date) -> anyhow::Result<usize> {
    let Some(user) = state.store.find_user(user_id).await? else {
        return Ok(0);
    };
    let pending: Vec<Reminder> = state
        .store
        .list_due_reminders(user_id, today, today + Duration::days(NOTIFY_WINDOW_DAYS))
        .await?
        .into_iter()
        .filter(|r| !r.notification_sent)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    state.notifier.send_digest(&user, &pending).await?;
    let ids: Vec<Uuid> = pending.iter().map(|r| r.id).collect();
    state.store.mark_reminders_notified(user_id, &ids).await?;
    info!(%user_id, count = ids.len(), "bill reminders sent");
    Ok(ids.len())
}

/// Runs [`notify_user`] for everyone with pending reminders; one user's failure
/// does not stop the others.
pub async fn notify_all(state: &AppState, today: Date) -> anyhow::Result<usize> {
    let users = state
        .store
        .users_with_pending_reminders(today, today + Duration::days(NOTIFY_WINDOW_DAYS))
        .await?;
    let mut sent = 0;
    for user_id in users {
        match notify_user(state, user_id, today).await {
            Ok(n) => sent += n,
            Err(e) => error!(%user_id, error = %e, "bill reminder digest failed"),
        }
    }
    Ok(sent)
}

/// Periodic check spawned by `main`.
pub async fn run_reminder_loop(state: AppState) {
    let secs = state.config.reminder_check_interval_secs;
    if secs == 0 {
        info!("reminder check disabled");
        return;
    }
    let mut ticker = tokio::time::interval(StdDuration::from_secs(secs));
    loop {
        ticker.tick().await;
        match notify_all(&state, today()).await {
            Ok(0) => debug!("no bill reminders due"),
            Ok(n) => info!(count = n, "reminder check finished"),
            Err(e) => warn!(error = %e, "reminder check failed"),
        }
    }
}

/// Keeps every digest it is given.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: std::sync::Mutex<Vec<(Uuid, Vec<Uuid>)>>,
}

#[cfg(test)]
#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_digest(&self, user: &User, reminders: &[Reminder]) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((user.id, reminders.iter().map(|r| r.id).collect()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::repo_types::NewUser, reminders::repo_types::NewReminder};
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use time::macros::date;

    const TODAY: Date = date!(2024 - 03 - 10);

    fn reminder(title: &str, amount: Option<i64>, due: Date) -> NewReminder {
        NewReminder {
            title: title.into(),
            amount: amount.map(Decimal::from),
            due_date: due,
            is_recurring: false,
            frequency: None,
            category_id: None,
        }
    }

    async fn user(state: &AppState, name: &str) -> Uuid {
        state
            .store
            .create_user(NewUser {
                username: name.into(),
                password_hash: "x".into(),
                email: format!("{name}@example.com"),
                first_name: name.into(),
                last_name: "Test".into(),
            })
            .await
            .unwrap()
            .id
    }

    #[test]
    fn digest_formats_amount_and_date() {
        let r = |amount| Reminder {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            title: "Rent".into(),
            amount,
            due_date: date!(2024 - 03 - 05),
            is_recurring: false,
            frequency: None,
            category_id: None,
            notification_sent: false,
        };
        let lines = digest_lines(&[r(Some(Decimal::new(12005, 1))), r(None)]);
        assert_eq!(lines[0], "- Rent: 1200.50 due on March 5, 2024");
        assert_eq!(lines[1], "- Rent: N/A due on March 5, 2024");
    }

    #[tokio::test]
    async fn sends_window_once_per_user() {
        let recorder = Arc::new(RecordingNotifier::default());
        let state = AppState {
            notifier: recorder.clone(),
            ..AppState::fake()
        };
        let alice = user(&state, "alice").await;
        let bob = user(&state, "bob").await;

        let soon = state
            .store
            .create_reminder(alice, reminder("Rent", Some(1200), date!(2024 - 03 - 12)))
            .await
            .unwrap();
        state
            .store
            .create_reminder(alice, reminder("Gym", None, date!(2024 - 03 - 20)))
            .await
            .unwrap();
        state
            .store
            .create_reminder(bob, reminder("Phone", Some(40), date!(2024 - 03 - 13)))
            .await
            .unwrap();

        assert_eq!(notify_all(&state, TODAY).await.unwrap(), 2);
        {
            let sent = recorder.sent.lock().unwrap();
            assert_eq!(sent.len(), 2);
            assert!(sent.contains(&(alice, vec![soon.id])));
        }

        // Already flagged.
        assert_eq!(notify_user(&state, alice, TODAY).await.unwrap(), 0);
        let stored = state.store.get_reminder(alice, soon.id).await.unwrap().unwrap();
        assert!(stored.notification_sent);
    }

    #[tokio::test]
    async fn failed_digest_leaves_reminders_pending() {
        struct Down;
        #[async_trait]
        impl Notifier for Down {
            async fn send_digest(&self, _: &User, _: &[Reminder]) -> anyhow::Result<()> {
                anyhow::bail!("smtp down")
            }
        }
        let state = AppState {
            notifier: Arc::new(Down),
            ..AppState::fake()
        };
        let alice = user(&state, "alice").await;
        let r = state
            .store
            .create_reminder(alice, reminder("Rent", None, TODAY))
            .await
            .unwrap();

        assert!(notify_user(&state, alice, TODAY).await.is_err());
        assert_eq!(notify_all(&state, TODAY).await.unwrap(), 0);
        let stored = state.store.get_reminder(alice, r.id).await.unwrap().unwrap();
        assert!(!stored.notification_sent);
    }
}
