use crate::browse::{run_browse, BrowseArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hireboard_console::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Hireboard Console",
    about = "Serve, browse, and demo the employer application list from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the reference applications API (default command)
    Serve(ServeArgs),
    /// Load one page of applications for a console URL and print it
    Browse(BrowseArgs),
    /// Walk through filtering, paging, selection, and a bulk reject in memory
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Number of sample applications to seed
    #[arg(long, default_value_t = crate::infra::DEFAULT_SEED_COUNT)]
    pub(crate) seed: usize,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(|| {
        Command::Serve(ServeArgs {
            seed: crate::infra::DEFAULT_SEED_COUNT,
            ..ServeArgs::default()
        })
    });

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Browse(args) => run_browse(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_optional_and_seed_has_a_default() {
        let cli = Cli::try_parse_from(["hireboard"]).expect("no subcommand parses");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["hireboard", "serve", "--port", "4100"])
            .expect("serve parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(4100));
                assert_eq!(args.seed, crate::infra::DEFAULT_SEED_COUNT);
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn browse_requires_a_location() {
        assert!(Cli::try_parse_from(["hireboard", "browse"]).is_err());

        let cli = Cli::try_parse_from([
            "hireboard",
            "browse",
            "--location",
            "?status=offer",
            "--api-url",
            "http://127.0.0.1:4100",
        ])
        .expect("browse parses");
        match cli.command {
            Some(Command::Browse(args)) => {
                assert_eq!(args.location, "?status=offer");
                assert_eq!(args.api_url.as_deref(), Some("http://127.0.0.1:4100"));
            }
            other => panic!("expected browse, got {other:?}"),
        }
    }
}
