use std::path::PathBuf;

use clap::Parser;

/// Watches a mirrored staging tree and converts dropped office documents to PDF.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "autopdf", version, about)]
pub struct Cli {
    /// Root directory of your documents.
    #[arg(long, value_name = "DIR")]
    pub persistence_path: Option<PathBuf>,

    /// Root directory for the temporary replica.
    #[arg(long, value_name = "DIR")]
    pub temporary_path: Option<PathBuf>,

    /// Fail instead of prompting when the configuration is incomplete.
    #[arg(long)]
    pub no_input: bool,

    /// Do not look for a newer converter release.
    #[arg(long)]
    pub no_update_check: bool,

    /// Do not open the staging tree in a file browser.
    #[arg(long)]
    pub no_browser: bool,

    /// Directory for config, log and converter package.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "autopdf",
            "--persistence-path",
            "/docs",
            "--temporary-path",
            "/tmp/replica",
            "--no-input",
            "--no-browser",
        ]);

        assert_eq!(cli.persistence_path, Some(PathBuf::from("/docs")));
        assert_eq!(cli.temporary_path, Some(PathBuf::from("/tmp/replica")));
        assert!(cli.no_input);
        assert!(cli.no_browser);
        assert!(!cli.no_update_check);
        assert_eq!(cli.data_dir, None);
    }

    #[test]
    fn test_command_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
