use clap::Parser;

use wearwolf::cli::command::{AlgorithmCommand, Cli, ColorChoice, Commands, ConfigCommand};
use wearwolf::cli::{
    algorithms, compare, config, detect, diagnostic, epochs, info, init, output,
};
use wearwolf::error::Result;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }

    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    if let Err(error) = dispatch(cli).await {
        diagnostic::render(&error);
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Detect(args) => detect::execute(&args),
        Commands::Compare(args) => compare::execute(&args).await,
        Commands::Epochs(args) => epochs::execute(&args),
        Commands::Info(args) => info::execute(&args.input),
        Commands::Algorithms(command) => match command {
            AlgorithmCommand::List => algorithms::execute_list(),
            AlgorithmCommand::Explain { name } => algorithms::execute_explain(&name),
        },
        Commands::Config(command) => match command {
            ConfigCommand::Init(args) => config::execute_init(&args.path, args.force),
            ConfigCommand::Show(args) => config::execute_show(&args.config),
            ConfigCommand::Validate(args) => config::execute_validate(&args.config),
        },
        Commands::Init(args) => init::execute(args.path, args.force),
    }
}
