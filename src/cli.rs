use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "dataset-rating service")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Start the rating API server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Create the rating table if it does not exist
    InitDb,
    /// Print the rating currently mirrored on a dataset
    Get {
        /// Dataset id or name
        dataset: String,
    },
    /// Record a user's vote on a dataset
    Post {
        /// Dataset id or name
        dataset: String,
        /// Voting user
        user: String,
        /// Score between 1 and 5
        #[arg(allow_negative_numbers = true)]
        score: i64,
    },
    /// List the ledger rows of a dataset
    Show {
        /// Dataset id or name
        dataset: String,
    },
}
