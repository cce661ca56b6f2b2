use clap::Args;
use soko_app::auth::{PgAuthService, Role, UserUuid};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct GrantRoleArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// User receiving the role
    #[arg(long)]
    user_uuid: Uuid,

    /// Role to grant (`admin` or `customer`)
    #[arg(long)]
    role: Role,
}

pub(crate) async fn run(args: GrantRoleArgs) -> Result<(), String> {
    let service = PgAuthService::new(super::super::connect(&args.database_url).await?);

    service
        .grant_role(UserUuid::from_uuid(args.user_uuid), args.role)
        .await
        .map_err(|error| format!("failed to grant role: {error}"))?;

    println!("granted {} to {}", args.role, args.user_uuid);

    Ok(())
}
