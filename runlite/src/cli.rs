use clap::Parser;

/// Activate the project's virtual environment, sync its dependencies and run the pipeline.
///
/// Takes no arguments. Paths come from RUNLITE_* variables or the `.env` file
/// next to the launcher.
#[derive(Parser, Debug)]
#[command(name = "runlite")]
#[command(author, version, about, long_about = None)]
pub struct Cli {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_accepted() {
        assert!(Cli::try_parse_from(["runlite"]).is_ok());
    }

    #[test]
    fn test_unknown_arguments_rejected() {
        let err = Cli::try_parse_from(["runlite", "--unknown-flag"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(Cli::try_parse_from(["runlite", "extra"]).is_err());
    }
}
