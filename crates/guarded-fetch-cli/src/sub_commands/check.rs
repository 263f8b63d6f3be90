use anyhow::{bail, Result};
use clap::Args;
use guarded_fetch::{BlockingFetcher, FetchRequest};

#[derive(Args)]
pub struct CheckSubCommand {
    /// URL to check
    url: String,
}

pub fn check(fetcher: &BlockingFetcher, sub_command_args: &CheckSubCommand) -> Result<()> {
    let request = FetchRequest::parse(&sub_command_args.url)?;

    if let Err(reason) = fetcher.uri_guard().check(request.url()) {
        bail!("{} is unsafe: {}", request.url(), reason);
    }

    println!("{} is safe", request.url());

    Ok(())
}
