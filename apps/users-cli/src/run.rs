//! Maps a parsed subcommand onto its handler and renders the result as JSON.

use domain_users::commands::{
    AwardBadge, BanUser, ChangeUsername, MakeModerator, MakeRegular, RegisterUser, RevokeBadge,
    UnbanUser,
};
use domain_users::cqrs::{Command as DomainCommand, CommandHandler, Query, QueryHandler};
use domain_users::queries::{GetUserByEmail, GetUserById, GetUsers};
use domain_users::{Application, BanTimeline, RequestContext, UserError};
use eyre::Result;
use serde_json::{Value, json};

use crate::cli::Command;

/// Attach the error kind so scripts can tell a conflict from a missing user.
fn report(name: &str, err: UserError) -> eyre::Report {
    let kind = err.kind();
    eyre::Report::new(err).wrap_err(format!("{} failed ({})", name, kind))
}

async fn execute<C, H>(handler: &H, ctx: &RequestContext, cmd: C) -> Result<C::Output>
where
    C: DomainCommand,
    H: CommandHandler<C>,
{
    handler
        .handle(ctx, cmd)
        .await
        .map_err(|e| report(C::NAME, e))
}

fn done(command: &str, user_id: &str) -> Value {
    json!({ "command": command, "userId": user_id, "status": "ok" })
}

pub async fn run(app: &Application, ctx: &RequestContext, command: Command) -> Result<Value> {
    let commands = &app.commands;
    let queries = &app.queries;

    let output = match command {
        Command::Register { email, username } => {
            let id = execute(&commands.register_user, ctx, RegisterUser { email, username }).await?;
            json!({ "command": RegisterUser::NAME, "userId": id, "status": "ok" })
        }
        Command::ChangeUsername { user_id, username } => {
            let cmd = ChangeUsername {
                user_id: user_id.clone(),
                username,
            };
            execute(&commands.change_username, ctx, cmd).await?;
            done(ChangeUsername::NAME, &user_id)
        }
        Command::MakeModerator { user_id } => {
            let cmd = MakeModerator {
                user_id: user_id.clone(),
            };
            execute(&commands.make_moderator, ctx, cmd).await?;
            done(MakeModerator::NAME, &user_id)
        }
        Command::MakeRegular { user_id } => {
            let cmd = MakeRegular {
                user_id: user_id.clone(),
            };
            execute(&commands.make_regular, ctx, cmd).await?;
            done(MakeRegular::NAME, &user_id)
        }
        Command::AwardBadge { user_id, badge } => {
            let cmd = AwardBadge {
                user_id: user_id.clone(),
                badge,
            };
            execute(&commands.award_badge, ctx, cmd).await?;
            done(AwardBadge::NAME, &user_id)
        }
        Command::RevokeBadge { user_id, badge } => {
            let cmd = RevokeBadge {
                user_id: user_id.clone(),
                badge,
            };
            execute(&commands.revoke_badge, ctx, cmd).await?;
            done(RevokeBadge::NAME, &user_id)
        }
        Command::Ban {
            user_id,
            reason,
            indefinite,
            from,
            to,
        } => {
            let timeline = match (from, to) {
                (Some(from), Some(to)) => {
                    Some(BanTimeline::new(from, to).map_err(|e| report(BanUser::NAME, e))?)
                }
                _ => None,
            };
            let cmd = BanUser {
                user_id: user_id.clone(),
                reason,
                indefinite,
                timeline,
            };
            execute(&commands.ban_user, ctx, cmd).await?;
            done(BanUser::NAME, &user_id)
        }
        Command::Unban { user_id } => {
            let cmd = UnbanUser {
                user_id: user_id.clone(),
            };
            execute(&commands.unban_user, ctx, cmd).await?;
            done(UnbanUser::NAME, &user_id)
        }
        Command::GetUser { id } => {
            let user = queries
                .get_user_by_id
                .handle(ctx, GetUserById { id })
                .await
                .map_err(|e| report(GetUserById::NAME, e))?;
            serde_json::to_value(user)?
        }
        Command::GetUserByEmail { email } => {
            let user = queries
                .get_user_by_email
                .handle(ctx, GetUserByEmail { email })
                .await
                .map_err(|e| report(GetUserByEmail::NAME, e))?;
            serde_json::to_value(user)?
        }
        Command::ListUsers { first, after, sort } => {
            let page = queries
                .get_users
                .handle(ctx, GetUsers { first, after, sort })
                .await
                .map_err(|e| report(GetUsers::NAME, e))?;
            serde_json::to_value(page)?
        }
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use domain_users::{AuthenticatedUser, Guards, InMemoryUserRepository, Role};

    fn app() -> Application {
        Application::from_store(Arc::new(InMemoryUserRepository::new()), Guards::default())
    }

    fn admin() -> RequestContext {
        RequestContext::for_user(AuthenticatedUser::new("root", "root@example.com", Role::Admin))
    }

    async fn register(app: &Application, name: &str) -> String {
        let output = run(
            app,
            &RequestContext::anonymous(),
            Command::Register {
                email: format!("{name}@example.com"),
                username: name.to_string(),
            },
        )
        .await
        .unwrap();
        output["userId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_register_then_get_user() {
        let app = app();
        let id = register(&app, "ada").await;

        let output = run(&app, &admin(), Command::GetUser { id: id.clone() })
            .await
            .unwrap();
        assert_eq!(output["id"], id);
        assert_eq!(output["username"], "ada");
        assert_eq!(output["role"], "REGULAR");
    }

    #[tokio::test]
    async fn test_ban_with_window() {
        let app = app();
        let id = register(&app, "bob").await;
        let from = chrono::Utc::now();

        let output = run(
            &app,
            &admin(),
            Command::Ban {
                user_id: id.clone(),
                reason: "spam".to_string(),
                indefinite: false,
                from: Some(from),
                to: Some(from + chrono::Duration::days(1)),
            },
        )
        .await
        .unwrap();
        assert_eq!(output["status"], "ok");

        let user = run(&app, &admin(), Command::GetUser { id }).await.unwrap();
        assert_eq!(user["ban_status"]["is_banned"], true);
    }

    #[tokio::test]
    async fn test_error_reports_kind() {
        let app = app();
        let id = register(&app, "carol").await;

        let err = run(&app, &RequestContext::anonymous(), Command::MakeModerator { user_id: id })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("make_moderator"));
        assert!(err.to_string().contains("unauthorized"));
    }

    #[tokio::test]
    async fn test_list_users_page() {
        let app = app();
        register(&app, "dave").await;
        register(&app, "erin").await;

        let output = run(
            &app,
            &admin(),
            Command::ListUsers {
                first: Some(1),
                after: None,
                sort: Default::default(),
            },
        )
        .await
        .unwrap();
        assert_eq!(output["items"].as_array().unwrap().len(), 1);
        assert_eq!(output["has_next"], true);
        assert!(output["end_cursor"].is_string());
    }
}
