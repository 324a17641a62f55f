use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("sark")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sark")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("harvest")
                .about(
                    "Crawl a target site, rank the words it uses, and expand the top \
                ranks into a mutation wordlist.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("Seed URL to start crawling from (bare hosts get http://)"),
                )
                .arg(
                    arg!(-l --"min-length" <CHARS>)
                        .required(false)
                        .help("Minimum word length to count (0 = keep everything)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("0"),
                )
                .arg(
                    arg!(-d --"depth" <HOPS>)
                        .required(false)
                        .help("How many link-hops deep to crawl (0 = seed page only)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("0"),
                )
                .arg(
                    arg!(-m --"limit" <WORDS>)
                        .required(false)
                        .help("Number of top-ranked words to expand into mutations")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Write the wordlist to a file (default: print to console)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async worker 'threads' in the worker pool.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"summary-json" <PATH>)
                        .required(false)
                        .help("Write run statistics as JSON to the given file")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("mutate")
                .about("Print the mutation set for a single word, no crawling involved.")
                .arg(
                    arg!(-w --"word" <WORD>)
                        .required(true)
                        .help("The word to expand"),
                ),
        )
}
