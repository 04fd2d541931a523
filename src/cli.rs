use std::io::{BufWriter, Write};

use clap::Parser;

use crate::error::Result;
use crate::output::Pager;
use crate::router::{self, Route};
use crate::travis::client::ApiClient;
use crate::travis::log::LogMode;
use crate::travis::{branches, build, log as joblog};

#[derive(Parser)]
#[command(name = "travlog")]
#[command(version, about = "Browse Travis CI builds, branches and job logs", long_about = None)]
pub struct Cli {
    /// Branch listing, build or job URL; "." resolves the current
    /// repository's remote
    #[arg(value_name = "URL")]
    url: String,

    /// Copy the raw log byte stream, embedded carriage returns included
    #[arg(long, conflicts_with = "timestamps")]
    raw_cr: bool,

    /// Prefix each log line with elapsed time since the first timing marker
    #[arg(long)]
    timestamps: bool,
}

impl Cli {
    fn log_mode(&self) -> LogMode {
        if self.raw_cr {
            LogMode::Raw
        } else if self.timestamps {
            LogMode::Timestamps
        } else {
            LogMode::Collapsed
        }
    }

    pub async fn execute(&self) -> Result<()> {
        let route = router::resolve(&self.url)?;
        let client = ApiClient::new()?;

        let pager = Pager::open()?;
        let mut out = BufWriter::new(pager);
        let result = self.dispatch(&client, &mut out, route).await;
        // The pager is closed and reaped whether the handler succeeded or not.
        let pager = out.into_inner().map_err(|e| e.into_error())?;
        pager.finish()?;
        result
    }

    async fn dispatch<W: Write>(
        &self,
        client: &ApiClient,
        out: &mut W,
        route: Route,
    ) -> Result<()> {
        match route {
            Route::Branches { project } => branches::show(client, out, &project).await,
            Route::Build { project, build_id } => {
                build::show(client, out, &project, &build_id).await
            }
            Route::Job { job_id, .. } => {
                joblog::show(client, out, &job_id, self.log_mode()).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_default_mode_is_collapsed() {
        assert_eq!(parse(&["travlog", "owner/repo"]).log_mode(), LogMode::Collapsed);
    }

    #[test]
    fn test_raw_cr_selects_raw_mode() {
        assert_eq!(
            parse(&["travlog", "--raw-cr", "owner/repo"]).log_mode(),
            LogMode::Raw
        );
    }

    #[test]
    fn test_timestamps_selects_timestamp_mode() {
        assert_eq!(
            parse(&["travlog", "--timestamps", "owner/repo"]).log_mode(),
            LogMode::Timestamps
        );
    }

    #[test]
    fn test_raw_cr_and_timestamps_are_mutually_exclusive() {
        assert!(Cli::try_parse_from(["travlog", "--raw-cr", "--timestamps", "x/y"]).is_err());
    }

    #[test]
    fn test_url_argument_is_required() {
        assert!(Cli::try_parse_from(["travlog"]).is_err());
    }
}
