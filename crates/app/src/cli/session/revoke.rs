use clap::Args;
use soko_app::auth::{PgAuthService, SessionUuid};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct RevokeSessionArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Session UUID to revoke
    #[arg(long)]
    session_uuid: Uuid,
}

pub(crate) async fn run(args: RevokeSessionArgs) -> Result<(), String> {
    let service = PgAuthService::new(super::super::connect(&args.database_url).await?);

    let revoked = service
        .revoke_session(SessionUuid::from_uuid(args.session_uuid))
        .await
        .map_err(|error| format!("failed to revoke session: {error}"))?;

    if revoked {
        println!("revoked session {}", args.session_uuid);
    } else {
        println!("session {} was not active", args.session_uuid);
    }

    Ok(())
}
