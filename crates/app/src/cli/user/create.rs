use clap::Args;
use soko_app::auth::{PgAuthService, Role, UserUuid, data::NewUser};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Unique email address
    #[arg(long)]
    email: String,

    /// Phone number used for notifications
    #[arg(long)]
    phone: Option<String>,

    /// Also grant the admin role
    #[arg(long)]
    admin: bool,

    /// Optional user UUID; generated when omitted
    #[arg(long)]
    user_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    if args.name.trim().is_empty() || args.email.trim().is_empty() {
        return Err("name and email cannot be empty".to_string());
    }

    let service = PgAuthService::new(super::super::connect(&args.database_url).await?);

    let user = service
        .create_user(NewUser {
            uuid: args.user_uuid.map_or_else(UserUuid::new, UserUuid::from_uuid),
            name: args.name.trim().to_string(),
            email: args.email.trim().to_string(),
            phone: args.phone,
        })
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    if args.admin {
        service
            .grant_role(user.uuid, Role::Admin)
            .await
            .map_err(|error| format!("failed to grant admin role: {error}"))?;
    }

    println!("user_uuid: {}", user.uuid);
    println!("name: {}", user.name);
    println!("email: {}", user.email);
    println!("admin: {}", args.admin);

    Ok(())
}
