//! Command-line host for the koidice tabletop engine.

mod commands;
mod storage;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kd",
    about = "koidice: character cards, dice pools and initiative for tabletop sessions",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding cards.json and initiative lists
    #[arg(long, global = true, default_value = ".")]
    data: PathBuf,

    /// TOML file with engine settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// RNG seed (overrides the config file)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Character card to act on
    #[arg(short, long, global = true, default_value = "default")]
    card: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set or adjust attributes, e.g. `力量60 dex50 san-1d6`
    St {
        /// Directive text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show a card's attributes
    Show {
        /// Card to show (default: --card)
        name: Option<String>,

        /// Only these attributes
        attributes: Vec<String>,
    },

    /// Manage character cards
    Pc {
        #[command(subcommand)]
        action: PcAction,
    },

    /// Roll an exploding d10 pool, e.g. `10a8` or `敏捷+剑`
    Pool {
        /// Pool expression
        #[arg(required = true, num_args = 1..)]
        expr: Vec<String>,

        /// Show every draw and how many dice exploded
        #[arg(long)]
        detail: bool,
    },

    /// Roll Call of Cthulhu investigators: `[6|7] [count]`
    Coc {
        /// Edition (6 or 7, default 7) and/or how many to roll (1-10)
        #[arg(num_args = 0..=2)]
        args: Vec<String>,
    },

    /// Sanity check, e.g. `1/1d6`
    Sc {
        /// Losses as <success>/<failure>
        losses: String,

        /// Roll against this value instead of the card's sanity
        value: Option<i64>,
    },

    /// Skill growth check
    En {
        /// Skill to improve
        skill: String,

        /// A skill value to roll against and/or a `+XdY/XdY` formula
        #[arg(num_args = 0..=2)]
        args: Vec<String>,
    },

    /// Initiative list for a channel
    Init {
        /// Channel the list belongs to
        #[arg(long, default_value = "default")]
        channel: String,

        #[command(subcommand)]
        action: Option<InitAction>,
    },
}

#[derive(Subcommand)]
enum PcAction {
    /// Create an empty card
    New {
        /// Card name
        name: String,
    },
    /// Delete a card
    Del {
        /// Card name
        name: String,
    },
    /// List all cards
    List,
}

#[derive(Subcommand)]
enum InitAction {
    /// Show the list
    List,
    /// Roll initiative: `[+N | -N | value | expr] [name...]`
    Roll {
        /// Modifier, value or expression, then the name
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Add an entry with a fixed value
    #[command(allow_negative_numbers = true)]
    Add {
        /// Entry name
        name: String,
        /// Initiative value
        value: i64,
    },
    /// Remove an entry
    Del {
        /// Entry name
        name: String,
    },
    /// Pass the turn to the next entry
    Next,
    /// Clear the list
    Clr,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("KD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = commands::Context::load(cli.data, cli.config.as_deref(), cli.seed, cli.card)
        .and_then(|mut ctx| match cli.command {
            Commands::St { text } => commands::st::run(&mut ctx, &text),
            Commands::Show { name, attributes } => {
                commands::show::run(&ctx, name.as_deref(), &attributes)
            }
            Commands::Pc { action } => match action {
                PcAction::New { name } => commands::pc::create(&ctx, &name),
                PcAction::Del { name } => commands::pc::delete(&ctx, &name),
                PcAction::List => commands::pc::list(&ctx),
            },
            Commands::Pool { expr, detail } => commands::pool::run(&mut ctx, &expr, detail),
            Commands::Coc { args } => commands::coc::run(&mut ctx, &args),
            Commands::Sc { losses, value } => commands::sc::run(&mut ctx, &losses, value),
            Commands::En { skill, args } => commands::en::run(&mut ctx, &skill, &args),
            Commands::Init { channel, action } => {
                let action = action.unwrap_or(InitAction::List);
                match action {
                    InitAction::List => commands::init::list(&ctx, &channel),
                    InitAction::Roll { args } => commands::init::roll(&mut ctx, &channel, &args),
                    InitAction::Add { name, value } => {
                        commands::init::add(&ctx, &channel, &name, value)
                    }
                    InitAction::Del { name } => commands::init::remove(&ctx, &channel, &name),
                    InitAction::Next => commands::init::next(&ctx, &channel),
                    InitAction::Clr => commands::init::clear(&ctx, &channel),
                }
            }
        });

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
