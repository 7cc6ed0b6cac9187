//! Command-line front end: resolve one host against a Public Suffix List
//! file and print its registrable domain.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::debug;

use domainsplit::{Error, Host, Policy, RuleSet};

/// Which list sections participate in the match.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Both sections; the longest match wins and PRIVATE breaks ties
    Cookie,
    /// Only the ICANN section
    Icann,
    /// Only the PRIVATE section
    Private,
}

impl From<PolicyArg> for Policy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Cookie => Policy::Cookie,
            PolicyArg::Icann => Policy::Icann,
            PolicyArg::Private => Policy::Private,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "domainsplit",
    version,
    about = "Print the registrable domain of a host per the Public Suffix List"
)]
struct Cli {
    /// Host name to resolve
    host: String,

    /// Path to the Public Suffix List text file (as published by Mozilla)
    #[arg(long, value_parser)]
    rules: PathBuf,

    /// Which list sections participate in the match
    #[arg(long, value_enum, default_value_t = PolicyArg::Cookie)]
    policy: PolicyArg,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(registrable) => {
            println!("{registrable}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("domainsplit: {err}");
            match err {
                Error::UnableToResolveDomain(_) | Error::UnableToResolveSubDomain(_) => {
                    ExitCode::from(1)
                }
                _ => ExitCode::from(2),
            }
        }
    }
}

fn run(cli: &Cli) -> Result<String, Error> {
    let text = fs::read_to_string(&cli.rules)
        .map_err(|err| Error::UnableToLoadList(format!("{}: {err}", cli.rules.display())))?;
    let rules = RuleSet::from_text(&text)?;
    debug!("loaded rules from {}", cli.rules.display());

    let host = Host::parse(&cli.host)?;
    let resolved = rules.resolve(&host, cli.policy.into())?;
    let registrable = resolved.registrable_domain().ok_or_else(|| {
        Error::UnableToResolveDomain(format!("`{host}` has no registrable domain"))
    })?;
    Ok(registrable.to_string())
}
