use crate::api::{ApiError, Mode};
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::notify::{NotificationBehavior, Notifier, Reminder};
use crate::repo::Repos;
use crate::{Config, Result};
use chrono::Local;
use tracing::warn;

/// Lists the reminders for the renewals the API has scheduled, using the notification settings
/// stored by the API.
pub async fn notifications_plan(config: Config, mode: Mode) -> Result<Out<Vec<Reminder>>> {
    let mut repos = Repos::open(&config, mode)?;
    let settings = repos.settings.fetch().await.pub_result(ErrorType::Api)?;
    let notifier = Notifier::init(NotificationBehavior::default(), &settings);
    if !notifier.is_enabled() {
        return Ok(Out::new(
            "Notifications are turned off, no reminders planned",
            Vec::new(),
        ));
    }

    let api = repos
        .api()
        .ok_or_else(ApiError::unconfigured)
        .pub_result(ErrorType::Api)?;
    let scheduled = api
        .scheduled_notifications()
        .await
        .pub_result(ErrorType::Api)?;
    let reminders = notifier.plan(&scheduled, Local::now().naive_local());

    let mut message = plural(reminders.len(), "reminder", "reminders");
    for reminder in &reminders {
        message.push_str(&format!(
            "\n{} | {} | {}",
            reminder.trigger.format("%Y-%m-%d %H:%M"),
            reminder.title,
            reminder.body
        ));
    }
    Ok(Out::new(message, reminders))
}

/// Produces a reminder that triggers right away. The default settings are used when the API is
/// unavailable.
pub async fn notifications_test(config: Config, mode: Mode) -> Result<Out<Reminder>> {
    let mut repos = Repos::open(&config, mode)?;
    let settings = match repos.settings.fetch().await {
        Ok(settings) => settings,
        Err(e) => {
            warn!(
                "Using the default notification settings: {}",
                e.user_message()
            );
            repos.settings.current().clone()
        }
    };
    let notifier = Notifier::init(NotificationBehavior::default(), &settings);
    let reminder = notifier
        .test_reminder(Local::now().naive_local())
        .pub_result(ErrorType::Notification)?;
    let message = format!(
        "{}: {} (channel '{}')",
        reminder.title,
        reminder.body,
        notifier.behavior().channel
    );
    Ok(Out::new(message, reminder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_plan_without_subscriptions() {
        let env = TestEnv::with_api().await;
        let out = notifications_plan(env.config(), Mode::Test).await.unwrap();
        assert_eq!(out.structure(), Some(&Vec::new()));
        assert_eq!(out.message(), "0 reminders");
    }

    #[tokio::test]
    async fn test_plan_needs_the_api() {
        let env = TestEnv::new().await;
        let err = notifications_plan(env.config(), Mode::Http)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Api);
    }

    #[tokio::test]
    async fn test_reminder_without_api_uses_defaults() {
        let env = TestEnv::new().await;
        let out = notifications_test(env.config(), Mode::Http).await.unwrap();
        let reminder = out.structure().unwrap();
        assert_eq!(reminder.title, "Test-Benachrichtigung");
        assert!(reminder.sound);
        assert!(reminder.subscription_id.is_none());
        assert!(out.message().ends_with("(channel 'Abo-Erinnerungen')"));
    }
}
