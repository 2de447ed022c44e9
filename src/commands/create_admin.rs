//! Create-admin command - bootstraps a privileged account.
//!
//! Privileged roles can never be reached through a role request, so the
//! first approver has to be created out of band.

use std::sync::Arc;

use crate::cli::args::CreateAdminArgs;
use crate::config::Config;
use crate::infra::{Database, Persistence};
use crate::services::{AuthService, Authenticator};
use common::AppResult;

/// Execute the create-admin command
pub async fn execute(args: CreateAdminArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config.database).await?;
    let auth = Authenticator::new(Arc::new(Persistence::new(db)), config);

    let user = auth
        .create_account(args.username, args.password, args.role)
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "Account created");
    println!("Created {} ({}) with role {}", user.username, user.id, user.role);
    Ok(())
}
