use std::io::IsTerminal;

use clap::Parser;

use kubic_init::cli::Cli;
use kubic_init::init::{self, InitOptions};
use kubic_init::logging;
use kubic_init::paths;
use kubic_init::remote::HttpSource;
use kubic_init::retry::RetryPolicy;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let opts = InitOptions {
        show_progress: std::io::stderr().is_terminal(),
        ..InitOptions::new(
            cli.repository,
            cli.image,
            paths::expand_home(&cli.ssh_pub_key),
        )
    };

    let source = HttpSource::new(RetryPolicy::with_retries(cli.retries))?;
    init::run(&source, &opts).await?;
    Ok(())
}
