use std::ffi::OsString;

use anyhow::bail;
use clap::Parser;
use flake::MAX_HOST_ID;

/// Long flags that are also accepted with a single leading dash.
const LONG_FLAGS: [&str; 4] = ["max", "hex", "integer", "host-id"];

/// Command line arguments for the `flake` binary.
///
/// Every flag can also be supplied through the environment (or a `.env`
/// file), which makes the binary easy to drive from scripts and containers.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flake",
    version,
    about = "Print k-sortable 64-bit flake IDs"
)]
pub struct CliArgs {
    /// Number of IDs to print.
    ///
    /// Environment variable: `FLAKE_MAX`
    #[arg(long, env = "FLAKE_MAX", default_value_t = 1)]
    pub max: usize,

    /// Print each ID as lowercase hex. This is the default when neither
    /// `--hex` nor `--integer` is given.
    ///
    /// Environment variable: `FLAKE_HEX`
    #[arg(long, env = "FLAKE_HEX", default_value_t = false)]
    pub hex: bool,

    /// Print each ID as an unsigned integer.
    ///
    /// Environment variable: `FLAKE_INTEGER`
    #[arg(long, env = "FLAKE_INTEGER", default_value_t = false)]
    pub integer: bool,

    /// Use this host ID instead of deriving one from the network address.
    ///
    /// Must be between 0 and 1023. Every process generating IDs at the same
    /// time needs its own value.
    ///
    /// Environment variable: `FLAKE_HOST_ID`
    #[arg(long, env = "FLAKE_HOST_ID")]
    pub host_id: Option<u64>,
}

impl CliArgs {
    /// Parses `args` after rewriting single-dash long flags (`-max 10`,
    /// `-max=10`, `-hex`) to their double-dash form.
    pub fn parse_normalized<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_args(args))
    }
}

/// Rewrites `-name` and `-name=value` to `--name` / `--name=value` for every
/// name in [`LONG_FLAGS`]. The binary name, values, unknown arguments and
/// everything after `--` pass through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();
    let mut passthrough = false;

    for arg in args {
        if passthrough {
            normalized.push(arg);
            continue;
        }
        if arg == "--" {
            passthrough = true;
            normalized.push(arg);
            continue;
        }

        let rewritten = arg.to_str().and_then(|text| {
            let flag = text.strip_prefix('-').filter(|rest| !rest.starts_with('-'))?;
            let name = flag.split_once('=').map_or(flag, |(name, _)| name);
            LONG_FLAGS.contains(&name).then(|| OsString::from(format!("-{text}")))
        });
        normalized.push(rewritten.unwrap_or(arg));
    }

    normalized
}

/// How each ID is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Hex,
    Integer,
    /// Integer line, then hex line.
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub count: usize,
    pub format: OutputFormat,
    pub host_id: Option<u64>,
}

impl TryFrom<CliArgs> for OutputConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if let Some(host_id) = args.host_id {
            if host_id > MAX_HOST_ID {
                bail!("FLAKE_HOST_ID ({host_id}) exceeds the host ID space (max = {MAX_HOST_ID})");
            }
        }

        let format = match (args.hex, args.integer) {
            (_, false) => OutputFormat::Hex,
            (false, true) => OutputFormat::Integer,
            (true, true) => OutputFormat::Both,
        };

        Ok(Self {
            count: args.max,
            format,
            host_id: args.host_id,
        })
    }
}
