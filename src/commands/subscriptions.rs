//! Subscription command handlers.
//!
//! These commands never fail because the API is unavailable. They fall back to the on-device
//! store and say so in their message.

use crate::api::Mode;
use crate::args::{AddSubscriptionArgs, UpdateSubscriptionArgs};
use crate::commands::{origin_note, plural, Out};
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{
    parse_amount, preset, BillingCycle, Cents, NewSubscription, Resource, Subscription,
    SubscriptionPatch, DATE_FORMAT,
};
use crate::repo::Repos;
use crate::{validate, Config, Result};
use anyhow::anyhow;
use chrono::Local;

pub async fn subscriptions_list(config: Config, mode: Mode) -> Result<Out<Vec<Subscription>>> {
    let mut repos = Repos::open(&config, mode)?;
    let listed = repos.subscriptions.list().await?;
    let mut message = format!(
        "{}{}",
        plural(listed.value.len(), "subscription", "subscriptions"),
        origin_note(&listed.origin)
    );
    for sub in &listed.value {
        message.push('\n');
        message.push_str(&describe(sub));
    }
    Ok(Out::new(message, listed.value))
}

pub async fn subscriptions_get(
    config: Config,
    mode: Mode,
    id: &str,
) -> Result<Out<Subscription>> {
    let repos = Repos::open(&config, mode)?;
    let found = repos.subscriptions.get(id).await?;
    let note = origin_note(&found.origin);
    Ok(match found.value {
        Some(sub) => Out::new(format!("{}{note}", describe(&sub)), sub),
        None => Out::new_message(format!("No subscription with id {id}{note}")),
    })
}

/// Adds a subscription after validating it. With a preset, unspecified fields come from the
/// preset's plan.
pub async fn subscriptions_add(
    config: Config,
    mode: Mode,
    args: AddSubscriptionArgs,
) -> Result<Out<Subscription>> {
    let new = new_subscription(args)?;
    validate::subscription(&new).pub_result(ErrorType::Validation)?;

    let mut repos = Repos::open(&config, mode)?;
    let created = repos.subscriptions.create(new).await?;
    let message = format!(
        "Added {}{}",
        describe(&created.value),
        origin_note(&created.origin)
    );
    Ok(Out::new(message, created.value))
}

pub async fn subscriptions_update(
    config: Config,
    mode: Mode,
    args: UpdateSubscriptionArgs,
) -> Result<Out<Subscription>> {
    let patch = SubscriptionPatch {
        name: args.name,
        category: args.category,
        amount_cents: args.amount.as_deref().map(|a| Cents::new(parse_amount(a))),
        billing_cycle: args.cycle,
        start_date: args.start_date,
        notes: args.notes,
        cancel_url: args.cancel_url,
    };
    validate_patch(&patch).pub_result(ErrorType::Validation)?;

    let mut repos = Repos::open(&config, mode)?;
    let updated = repos.subscriptions.update(&args.id, &patch).await?;
    let note = origin_note(&updated.origin);
    Ok(match updated.value {
        Some(sub) => Out::new(format!("Updated {}{note}", describe(&sub)), sub),
        None => Out::new_message(format!("No subscription with id {}{note}", args.id)),
    })
}

pub async fn subscriptions_delete(
    config: Config,
    mode: Mode,
    id: &str,
) -> Result<Out<Vec<Subscription>>> {
    let mut repos = Repos::open(&config, mode)?;
    let remaining = repos.subscriptions.delete(id).await?;
    let message = format!(
        "Deleted {id}, {} left{}",
        plural(remaining.value.len(), "subscription", "subscriptions"),
        origin_note(&remaining.origin)
    );
    Ok(Out::new(message, remaining.value))
}

/// Fills an empty on-device store with one subscription per known service.
pub async fn subscriptions_seed(config: Config, mode: Mode) -> Result<Out<usize>> {
    let mut repos = Repos::open(&config, mode)?;
    let added = repos
        .subscriptions
        .seed_from_presets(Local::now().date_naive())
        .await?;
    let message = if added == 0 {
        "The local store already has subscriptions, nothing was added".to_string()
    } else {
        format!(
            "Added {} to the local store",
            plural(added, "subscription", "subscriptions")
        )
    };
    Ok(Out::new(message, added))
}

/// `Netflix | Streaming | 12,99 €/Monat | <id>`
fn describe(sub: &Subscription) -> String {
    format!(
        "{} | {} | {}{} | {}",
        sub.name,
        sub.category,
        sub.amount_cents,
        sub.billing_cycle.short_label(),
        sub.id
    )
}

fn new_subscription(args: AddSubscriptionArgs) -> Result<NewSubscription> {
    let start_date = args
        .start_date
        .unwrap_or_else(|| Local::now().date_naive().format(DATE_FORMAT).to_string());
    let base = match args.preset.as_deref() {
        None => NewSubscription {
            name: String::new(),
            category: "Sonstiges".to_string(),
            amount_cents: Cents::ZERO,
            billing_cycle: BillingCycle::Monthly,
            start_date,
            notes: None,
            cancel_url: None,
        },
        Some(id) => {
            let service = preset(id)
                .ok_or_else(|| anyhow!("Unknown preset '{id}'"))
                .pub_result(ErrorType::Validation)?;
            let plan = match args.plan.as_deref() {
                None => service.plans.first(),
                Some(name) => service.plans.iter().find(|p| p.name == name),
            }
            .ok_or_else(|| anyhow!("The preset '{id}' has no such plan"))
            .pub_result(ErrorType::Validation)?;
            service.subscription(plan, &start_date)
        }
    };
    Ok(NewSubscription {
        name: args.name.unwrap_or(base.name),
        category: args.category.unwrap_or(base.category),
        amount_cents: args
            .amount
            .as_deref()
            .map(|a| Cents::new(parse_amount(a)))
            .unwrap_or(base.amount_cents),
        billing_cycle: args.cycle.unwrap_or(base.billing_cycle),
        start_date: base.start_date,
        notes: args.notes.or(base.notes),
        cancel_url: args.cancel_url.or(base.cancel_url),
    })
}

fn validate_patch(patch: &SubscriptionPatch) -> Res<()> {
    if Subscription::is_empty_patch(patch) {
        return Err(anyhow!("Nothing to update"));
    }
    if let Some(name) = &patch.name {
        validate::name(name)?;
    }
    if let Some(category) = &patch.category {
        validate::category(category)?;
    }
    if let Some(amount) = patch.amount_cents {
        validate::amount(amount)?;
    }
    if let Some(start_date) = &patch.start_date {
        validate::start_date(start_date)?;
    }
    validate::notes(patch.notes.as_deref())?;
    validate::cancel_url(patch.cancel_url.as_deref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::is_local_id;
    use crate::test::TestEnv;

    fn add_args(name: &str, amount: &str) -> AddSubscriptionArgs {
        AddSubscriptionArgs {
            preset: None,
            plan: None,
            name: Some(name.into()),
            category: Some("Streaming".into()),
            amount: Some(amount.into()),
            cycle: None,
            start_date: Some("2025-01-15".into()),
            notes: None,
            cancel_url: None,
        }
    }

    #[tokio::test]
    async fn test_add_and_list_locally() {
        let env = TestEnv::new().await;
        let out = subscriptions_add(env.config(), Mode::Http, add_args("Netflix", "12,99"))
            .await
            .unwrap();
        assert!(out.message().contains("no API configured"));
        let created = out.structure().unwrap().clone();
        assert!(is_local_id(&created.id));
        assert_eq!(created.billing_cycle, BillingCycle::Monthly);

        let listed = subscriptions_list(env.config(), Mode::Http).await.unwrap();
        assert_eq!(listed.structure().unwrap(), &vec![created.clone()]);
        assert!(listed.message().contains("12,99 €/Monat"));

        let got = subscriptions_get(env.config(), Mode::Http, &created.id)
            .await
            .unwrap();
        assert_eq!(got.structure(), Some(&created));
    }

    #[tokio::test]
    async fn test_invalid_amount_is_rejected() {
        let env = TestEnv::new().await;
        for amount in ["0", "-5", "zwölf"] {
            let err = subscriptions_add(env.config(), Mode::Http, add_args("Netflix", amount))
                .await
                .unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Validation);
        }
        let listed = subscriptions_list(env.config(), Mode::Http).await.unwrap();
        assert!(listed.structure().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_from_preset() {
        let env = TestEnv::new().await;
        let args = AddSubscriptionArgs {
            preset: Some("netflix".into()),
            name: None,
            category: None,
            amount: None,
            start_date: None,
            ..add_args("", "")
        };
        let out = subscriptions_add(env.config(), Mode::Http, args).await.unwrap();
        let created = out.structure().unwrap();
        let service = preset("netflix").unwrap();
        assert_eq!(created.name, service.plans[0].name);
        assert_eq!(created.amount_cents, service.plans[0].amount_cents);
        assert_eq!(created.category, service.category);
    }

    #[tokio::test]
    async fn test_unknown_preset() {
        let env = TestEnv::new().await;
        let args = AddSubscriptionArgs {
            preset: Some("nope".into()),
            ..add_args("x", "1")
        };
        let err = subscriptions_add(env.config(), Mode::Http, args)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_update_and_delete_locally() {
        let env = TestEnv::new().await;
        let created = subscriptions_add(env.config(), Mode::Http, add_args("Netflix", "12,99"))
            .await
            .unwrap()
            .structure()
            .unwrap()
            .clone();

        let update = UpdateSubscriptionArgs {
            id: created.id.clone(),
            name: None,
            category: None,
            amount: Some("17,99".into()),
            cycle: None,
            start_date: None,
            notes: None,
            cancel_url: None,
        };
        let updated = subscriptions_update(env.config(), Mode::Http, update.clone())
            .await
            .unwrap();
        assert_eq!(updated.structure().unwrap().amount_cents, Cents::new(1799));

        let empty = UpdateSubscriptionArgs {
            amount: None,
            ..update
        };
        let err = subscriptions_update(env.config(), Mode::Http, empty)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);

        let deleted = subscriptions_delete(env.config(), Mode::Http, &created.id)
            .await
            .unwrap();
        assert!(deleted.structure().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remote_add() {
        let env = TestEnv::with_api().await;
        let out = subscriptions_add(env.config(), Mode::Test, add_args("Netflix", "12,99"))
            .await
            .unwrap();
        assert!(!is_local_id(&out.structure().unwrap().id));
        assert!(!out.message().contains("on this device"));
    }

    #[tokio::test]
    async fn test_seed() {
        let env = TestEnv::new().await;
        let out = subscriptions_seed(env.config(), Mode::Http).await.unwrap();
        assert!(*out.structure().unwrap() > 0);
        let again = subscriptions_seed(env.config(), Mode::Http).await.unwrap();
        assert_eq!(again.structure(), Some(&0));
    }
}
