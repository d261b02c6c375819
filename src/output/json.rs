//! JSON fixture output.

use crate::generator::GeneratedFixture;
use std::io::Write;

/// Write the fixture as pretty-printed JSON followed by a newline
pub fn write_json<W: Write>(fixture: &GeneratedFixture, writer: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, fixture)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
