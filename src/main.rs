use anyhow::Result;

use dataset_rating::cli::Command;
use dataset_rating::{handle_get, handle_init_db, handle_post, handle_serve, handle_show, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::InitDb => handle_init_db(),
        Command::Get { dataset } => handle_get(dataset),
        Command::Post {
            dataset,
            user,
            score,
        } => handle_post(dataset, user, *score),
        Command::Show { dataset } => handle_show(dataset),
    }
}
