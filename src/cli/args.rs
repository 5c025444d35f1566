//! CLI argument definitions using clap

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::errors::{PulsewrapError, Result};
use crate::http::Method;
use crate::request::Params;

#[derive(Parser, Debug, Clone)]
#[command(name = "pulsewrap", version, about = "Send one HTTP request and print the response", long_about = None)]
pub struct Args {
    /// The URL to request
    #[arg(value_name = "URL")]
    pub url: String,

    /// Request method (defaults to GET, or POST when data is given)
    #[arg(short = 'X', long = "request", value_name = "METHOD")]
    pub method: Option<String>,

    /// Form field, repeatable. Sent in the query string for GET and HEAD
    #[arg(short = 'd', long = "data", value_name = "KEY=VALUE")]
    pub data: Vec<String>,

    /// Pre-encoded data sent as is
    #[arg(long = "data-raw", value_name = "DATA", conflicts_with = "data")]
    pub data_raw: Option<String>,

    /// Extra header line, repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// User-Agent to send
    #[arg(short = 'A', long = "user-agent", value_name = "AGENT")]
    pub user_agent: Option<String>,

    /// Read cookies from and save cookies to this file
    #[arg(short = 'c', long = "cookie-jar", value_name = "FILE")]
    pub cookie_jar: Option<PathBuf>,

    /// Follow redirects
    #[arg(short = 'L', long = "location", action = ArgAction::SetTrue)]
    pub follow: bool,

    /// Referer header to send
    #[arg(short = 'e', long = "referer", value_name = "URL")]
    pub referer: Option<String>,

    /// Transport option, repeatable (e.g. timeout=10, CURLOPT_MAXREDIRS=3)
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Print the status line and headers before the body
    #[arg(short = 'i', long = "include", action = ArgAction::SetTrue)]
    pub include: bool,

    /// Send a HEAD request and print the headers
    #[arg(short = 'I', long = "head", action = ArgAction::SetTrue)]
    pub head: bool,

    /// Config file (defaults to the user config dir)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ignore the default config file
    #[arg(long = "no-config", action = ArgAction::SetTrue, conflicts_with = "config")]
    pub no_config: bool,

    /// Log request details to stderr; repeat for more
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Method to send, from `-I`, `-X` or the presence of data
    pub fn request_method(&self) -> Result<Method> {
        if self.head {
            return Ok(Method::Head);
        }
        match &self.method {
            Some(m) => m.parse(),
            None if self.data.is_empty() && self.data_raw.is_none() => Ok(Method::Get),
            None => Ok(Method::Post),
        }
    }

    pub fn params(&self) -> Params {
        if let Some(raw) = &self.data_raw {
            return Params::Raw(raw.clone());
        }
        if self.data.is_empty() {
            return Params::None;
        }
        Params::pairs(self.data.iter().map(|item| match item.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (item.clone(), String::new()),
        }))
    }

    /// `-o` values as name/value pairs
    pub fn option_pairs(&self) -> Result<Vec<(&str, &str)>> {
        self.options
            .iter()
            .map(|item| {
                item.split_once('=')
                    .map(|(name, value)| (name.trim(), value.trim()))
                    .ok_or_else(|| PulsewrapError::Config(format!("Expected NAME=VALUE, got {:?}", item)))
            })
            .collect()
    }
}
