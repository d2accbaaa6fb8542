use react_pod::cli::commands::{CliArgs, Commands};
use react_pod::cli::handlers::{handle_convert, handle_update};
use react_pod::{init_logging, LoggingConfig, VERSION};

use clap::Parser;
use tracing::debug;

fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_flags(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("react-pod v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let directory = args.directory.as_deref();
    let exit_code = match &args.command {
        Commands::Convert(convert_args) => handle_convert(convert_args, directory, args.quiet),
        Commands::Update => handle_update(directory, args.quiet),
    };

    std::process::exit(exit_code);
}
