//! Command-line execution
//!
//! Parses arguments, assembles the client state (config file first, flags
//! on top), sends one request and prints the result.

use clap::Parser;
use std::io::{self, Write};
use tracing::debug;

use crate::cli::Args;
use crate::client::Client;
use crate::config::ClientState;
use crate::errors::Result;
use crate::request::OptionValue;
use crate::response::Response;
use crate::status::ExitStatus;

/// Run the CLI with `args` (program name first)
pub fn run(args: Vec<String>) -> ExitStatus {
    let parsed = match Args::try_parse_from(&args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    init_logging(parsed.verbose);

    let stdout = io::stdout();
    match execute(&parsed, &mut stdout.lock()) {
        Ok(()) => ExitStatus::Success,
        Err(e) => {
            eprintln!("pulsewrap: {}", e);
            ExitStatus::Error
        }
    }
}

/// Send the request described by `args` and print the response to `out`
pub fn execute(args: &Args, out: &mut impl Write) -> Result<()> {
    let state = build_state(args)?;
    let method = args.request_method()?;
    let headers: Vec<&str> = args.headers.iter().map(String::as_str).collect();

    let mut client = Client::new(state);
    let response = client.request(method, &args.url, args.params(), &headers)?;

    write_response(&response, args.include || args.head, out)?;
    Ok(())
}

/// Config file values, then command-line flags on top
pub fn build_state(args: &Args) -> Result<ClientState> {
    let mut state = match &args.config {
        Some(path) => ClientState::load(path)?,
        None if args.no_config => ClientState::default(),
        None => {
            let path = ClientState::default_path();
            if path.exists() {
                debug!(path = %path.display(), "Loading config");
                ClientState::load(&path)?
            } else {
                ClientState::default()
            }
        }
    };

    if let Some(user_agent) = &args.user_agent {
        state.user_agent = user_agent.clone();
    }
    if let Some(path) = &args.cookie_jar {
        state.cookie_file = Some(path.clone());
    }
    if args.follow {
        state.follow_redirects = true;
    }
    if let Some(referer) = &args.referer {
        state.referrer = Some(referer.clone());
    }
    for (name, value) in args.option_pairs()? {
        state.default_options.set_named(name, OptionValue::Text(value.to_string()))?;
    }

    Ok(state)
}

/// Print the response; status line and headers only when `include` is set
pub fn write_response(response: &Response, include: bool, out: &mut impl Write) -> io::Result<()> {
    if include {
        write!(out, "HTTP/{} {}", response.version(), response.status())?;
        if !response.reason().is_empty() {
            write!(out, " {}", response.reason())?;
        }
        write!(out, "\r\n")?;
        for (name, values) in response.headers() {
            for value in values {
                write!(out, "{}: {}\r\n", name, value)?;
            }
        }
        write!(out, "\r\n")?;
    }
    out.write_all(response.body())?;
    out.flush()
}

/// Log to stderr; `PULSEWRAP_LOG` wins over `-v`
fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("PULSEWRAP_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("pulsewrap={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
