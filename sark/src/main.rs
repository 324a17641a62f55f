use sark::commands::command_argument_builder;
use sark::handlers::{handle_harvest, handle_mutate, print_banner};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("harvest", primary_command)) => {
            if let Err(e) = handle_harvest(primary_command).await {
                eprintln!("✗ Harvest failed: {e:#}");
                std::process::exit(1);
            }
        }
        Some(("mutate", primary_command)) => handle_mutate(primary_command),
        None => {
            // No subcommand provided, just show the banner
        }
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
