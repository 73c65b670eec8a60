use clap::{CommandFactory, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kids-rewards", version, about = "Kids Rewards CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current day, strike count and points
    Status,
    /// List the house rules with their numbers
    Rules,
    /// Record a strike against a rule
    Strike {
        /// Rule number as shown by `rules` (1-8)
        rule: usize,
    },
    /// End the current day and start the next
    EndDay,
    /// Print every stored day
    Days,
    /// List rewards and their costs
    Rewards,
    /// Redeem points for a reward
    Redeem {
        /// Reward key as shown by `rewards` (e.g. "toy")
        reward: String,
    },
    /// PIN-protected admin operations
    Admin {
        /// Shared admin PIN
        #[arg(long)]
        pin: String,
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Status => commands::day::status(),
        Commands::Rules => commands::day::rules(),
        Commands::Strike { rule } => commands::day::strike(rule),
        Commands::EndDay => commands::day::end_day(),
        Commands::Days => commands::day::days(),
        Commands::Rewards => commands::rewards::list(),
        Commands::Redeem { reward } => commands::rewards::redeem(&reward),
        Commands::Admin { pin, action } => commands::admin::run(&pin, action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "kids-rewards", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
