use std::io::{self, Write};

use flake::FlakeId;

use crate::config::OutputFormat;

/// Writes one line per ID (two for [`OutputFormat::Both`]).
pub fn write_ids<W, I>(out: &mut W, format: OutputFormat, ids: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = FlakeId>,
{
    for id in ids {
        match format {
            OutputFormat::Hex => writeln!(out, "{id}")?,
            OutputFormat::Integer => writeln!(out, "{}", id.to_u64())?,
            OutputFormat::Both => {
                writeln!(out, "{}", id.to_u64())?;
                writeln!(out, "{id}")?;
            }
        }
    }
    Ok(())
}
