use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use restyle::serve::{self, DEFAULT_ADDR};
use restyle::web::{self, Page};
use restyle::{Error, Result};
use tracing::{info, span, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

enum Command {
    /// Run the proxy
    Serve { addr: String },
    /// Fetch and rewrite one page
    Get { path: String },
    /// Rewrite a saved page as if it had been fetched for `path`
    File { path: String, input: PathBuf },
}

struct Args {
    pub command: Command,
    pub output: Option<PathBuf>,
    pub trace: bool,
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: restyle serve [--addr <host:port>] | get <path> | file <path> <input.html> [-o <file>] [-t]");
            return ExitCode::from(2);
        }
    };
    if args.trace {
        tracing_subscriber::fmt::fmt()
            .with_span_events(FmtSpan::ACTIVE)
            .with_max_level(Level::DEBUG)
            .with_env_filter(EnvFilter::from_default_env())
            .finish()
            .init();
        info!("Logger initialized");
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_args() -> Result<Args> {
    let mut pargs = pico_args::Arguments::from_env();
    let subcommand = pargs.subcommand()?;
    let trace = pargs.contains(["-t", "--trace"]);
    let output = pargs.opt_value_from_str(["-o", "--output"])?;
    let command = match subcommand.as_deref() {
        Some("serve") => Command::Serve {
            addr: pargs
                .opt_value_from_str("--addr")?
                .unwrap_or_else(|| DEFAULT_ADDR.to_string()),
        },
        Some("get") => Command::Get {
            path: pargs.free_from_str()?,
        },
        Some("file") => Command::File {
            path: pargs.free_from_str()?,
            input: pargs.free_from_str()?,
        },
        _ => return Err(Error::Usage),
    };
    Ok(Args {
        command,
        output,
        trace,
    })
}

fn run(args: Args) -> Result<()> {
    let page = match args.command {
        Command::Serve { addr } => return serve::serve(&addr),
        Command::Get { path } => Page::fetch(&web::client()?, &path)?,
        Command::File { path, input } => Page::from_html(&path, fs::read_to_string(input)?)?,
    };
    let html = page.transform();

    let span = span!(Level::DEBUG, "Saving result");
    let _enter = span.enter();
    match args.output {
        Some(output) => fs::write(output, html)?,
        None => std::io::stdout().lock().write_all(html.as_bytes())?,
    }
    Ok(())
}
