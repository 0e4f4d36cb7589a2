//! Expense command handlers. Expenses are only stored by the API, so these fail when it is
//! unavailable.

use crate::api::Mode;
use crate::args::{AddExpenseArgs, UpdateExpenseArgs};
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{parse_amount, Cents, Expense, ExpensePatch, NewExpense, Resource};
use crate::repo::Repos;
use crate::{validate, Config, Result};
use anyhow::anyhow;

pub async fn expenses_list(config: Config, mode: Mode) -> Result<Out<Vec<Expense>>> {
    let mut repos = Repos::open(&config, mode)?;
    let list = repos.expenses.list().await.pub_result(ErrorType::Api)?;
    let mut message = plural(list.len(), "expense", "expenses");
    for expense in &list {
        message.push('\n');
        message.push_str(&describe(expense));
    }
    Ok(Out::new(message, list))
}

pub async fn expenses_get(config: Config, mode: Mode, id: &str) -> Result<Out<Expense>> {
    let repos = Repos::open(&config, mode)?;
    let expense = repos.expenses.get(id).await.pub_result(ErrorType::Api)?;
    Ok(Out::new(describe(&expense), expense))
}

pub async fn expenses_add(config: Config, mode: Mode, args: AddExpenseArgs) -> Result<Out<Expense>> {
    let new = NewExpense {
        name: args.name,
        category: args.category,
        amount_cents: Cents::new(parse_amount(&args.amount)),
        billing_cycle: args.cycle.unwrap_or_default(),
        notes: args.notes,
    };
    validate::expense(&new).pub_result(ErrorType::Validation)?;

    let mut repos = Repos::open(&config, mode)?;
    let created = repos.expenses.create(&new).await.pub_result(ErrorType::Api)?;
    Ok(Out::new(format!("Added {}", describe(&created)), created))
}

pub async fn expenses_update(
    config: Config,
    mode: Mode,
    args: UpdateExpenseArgs,
) -> Result<Out<Expense>> {
    let patch = ExpensePatch {
        name: args.name,
        category: args.category,
        amount_cents: args.amount.as_deref().map(|a| Cents::new(parse_amount(a))),
        billing_cycle: args.cycle,
        notes: args.notes,
    };
    validate_patch(&patch).pub_result(ErrorType::Validation)?;

    let mut repos = Repos::open(&config, mode)?;
    let updated = repos
        .expenses
        .update(&args.id, &patch)
        .await
        .pub_result(ErrorType::Api)?;
    Ok(Out::new(format!("Updated {}", describe(&updated)), updated))
}

pub async fn expenses_delete(config: Config, mode: Mode, id: &str) -> Result<Out<()>> {
    let mut repos = Repos::open(&config, mode)?;
    repos.expenses.delete(id).await.pub_result(ErrorType::Api)?;
    Ok(format!("Deleted expense {id}").into())
}

/// `Miete | Wohnen | 850,00 €/Monat | <id>`
fn describe(expense: &Expense) -> String {
    format!(
        "{} | {} | {}{} | {}",
        expense.name,
        expense.category,
        expense.amount_cents,
        expense.billing_cycle.short_label(),
        expense.id
    )
}

fn validate_patch(patch: &ExpensePatch) -> Res<()> {
    if Expense::is_empty_patch(patch) {
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
    validate::notes(patch.notes.as_deref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorCode;
    use crate::test::TestEnv;

    fn rent() -> AddExpenseArgs {
        AddExpenseArgs {
            name: "Miete".into(),
            category: "Wohnen".into(),
            amount: "850".into(),
            cycle: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_is_an_api_error() {
        let env = TestEnv::new().await;
        let err = expenses_list(env.config(), Mode::Http).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Api);
        assert_eq!(
            err.api_error().map(|e| e.code()),
            Some(ErrorCode::NetworkError)
        );
    }

    #[tokio::test]
    async fn test_add_remotely() {
        let env = TestEnv::with_api().await;
        let out = expenses_add(env.config(), Mode::Test, rent()).await.unwrap();
        let created = out.structure().unwrap();
        assert_eq!(created.amount_cents, Cents::new(85000));
        assert!(out.message().contains("850,00 €/Monat"));
    }

    #[tokio::test]
    async fn test_validation_happens_first() {
        let env = TestEnv::new().await;
        let args = AddExpenseArgs {
            amount: "0".into(),
            ..rent()
        };
        let err = expenses_add(env.config(), Mode::Http, args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let env = TestEnv::with_api().await;
        let args = UpdateExpenseArgs {
            id: "65a1f0c20000000000000001".into(),
            name: Some("Miete".into()),
            category: None,
            amount: None,
            cycle: None,
            notes: None,
        };
        let err = expenses_update(env.config(), Mode::Test, args)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Fixkosten nicht gefunden");
    }
}
