use anyhow::Result;
use clap::Args;
use guarded_fetch::BlockingFetcher;

use super::{accept_types, print_response};

#[derive(Args)]
pub struct GetSubCommand {
    /// URL to fetch
    url: String,
    /// Acceptable media type, may be repeated
    #[arg(short, long)]
    accept: Vec<String>,
    /// Print the status line and headers before the body
    #[arg(short, long)]
    include: bool,
}

pub fn get(fetcher: &BlockingFetcher, sub_command_args: &GetSubCommand) -> Result<()> {
    let response = fetcher.fetch_with(
        &sub_command_args.url,
        None,
        accept_types(&sub_command_args.accept),
    )?;

    print_response(&response, sub_command_args.include);

    Ok(())
}
