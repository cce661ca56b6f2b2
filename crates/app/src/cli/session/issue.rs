use clap::Args;
use jiff::Timestamp;
use soko_app::auth::{PgAuthService, UserUuid};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct IssueSessionArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// User the session authenticates as
    #[arg(long)]
    user_uuid: Uuid,

    /// Optional expiration timestamp (RFC 3339)
    #[arg(long)]
    expires_at: Option<String>,
}

pub(crate) async fn run(args: IssueSessionArgs) -> Result<(), String> {
    let expires_at = parse_expires_at(args.expires_at.as_deref())?;

    if let Some(expires_at) = expires_at.as_ref()
        && *expires_at <= Timestamp::now()
    {
        return Err("expires-at must be in the future".to_string());
    }

    let service = PgAuthService::new(super::super::connect(&args.database_url).await?);

    let issued = service
        .issue_session(UserUuid::from_uuid(args.user_uuid), expires_at)
        .await
        .map_err(|error| format!("failed to issue session: {error}"))?;

    println!("session_uuid: {}", issued.session.uuid);
    println!("user_uuid: {}", issued.session.user_uuid);
    println!("created_at: {}", issued.session.created_at);
    if let Some(expires_at) = issued.session.expires_at {
        println!("expires_at: {expires_at}");
    }
    println!("bearer_token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}

fn parse_expires_at(raw: Option<&str>) -> Result<Option<Timestamp>, String> {
    raw.map(|value| {
        value
            .parse::<Timestamp>()
            .map_err(|error| format!("invalid expires-at timestamp: {error}"))
    })
    .transpose()
}
