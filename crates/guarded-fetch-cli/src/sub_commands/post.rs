use anyhow::{anyhow, Result};
use clap::Args;
use guarded_fetch::BlockingFetcher;

use super::{accept_types, print_response};

#[derive(Args)]
pub struct PostSubCommand {
    /// URL to post to
    url: String,
    /// Form field as KEY=VALUE, may be repeated
    #[arg(short, long, conflicts_with = "data")]
    field: Vec<String>,
    /// Raw, already encoded request body
    #[arg(short, long)]
    data: Option<String>,
    /// Acceptable media type, may be repeated
    #[arg(short, long)]
    accept: Vec<String>,
    /// Print the status line and headers before the body
    #[arg(short, long)]
    include: bool,
}

pub fn post(fetcher: &BlockingFetcher, sub_command_args: &PostSubCommand) -> Result<()> {
    let body = match &sub_command_args.data {
        Some(data) => data.clone(),
        None => encode_fields(&sub_command_args.field)?,
    };

    let response = fetcher.fetch_with(
        &sub_command_args.url,
        Some(body.into()),
        accept_types(&sub_command_args.accept),
    )?;

    print_response(&response, sub_command_args.include);

    Ok(())
}

/// Form-encode `KEY=VALUE` pairs
fn encode_fields(fields: &[String]) -> Result<String> {
    let pairs = fields
        .iter()
        .map(|field| {
            field
                .split_once('=')
                .ok_or_else(|| anyhow!("Field `{field}` is not KEY=VALUE"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(serde_urlencoded::to_string(pairs)?)
}
