//! JSON rendering of the schema description

use std::io::Write;

use anyhow::Result;

use crate::emitter::SchemaDescription;

/// Write the description as pretty-printed JSON followed by a newline
pub fn render_json<W: Write>(writer: &mut W, description: &SchemaDescription) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, description)?;
    writeln!(writer)?;
    Ok(())
}
