use clap::{Args, Subcommand};

mod issue;
mod list;
mod revoke;

#[derive(Debug, Args)]
pub(crate) struct SessionCommand {
    #[command(subcommand)]
    command: SessionSubcommand,
}

#[derive(Debug, Subcommand)]
enum SessionSubcommand {
    Issue(issue::IssueSessionArgs),
    List(list::ListSessionsArgs),
    Revoke(revoke::RevokeSessionArgs),
}

pub(crate) async fn run(command: SessionCommand) -> Result<(), String> {
    match command.command {
        SessionSubcommand::Issue(args) => issue::run(args).await,
        SessionSubcommand::List(args) => list::run(args).await,
        SessionSubcommand::Revoke(args) => revoke::run(args).await,
    }
}
