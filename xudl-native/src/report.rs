use std::io::{self, Write};

/// Writes each byte as a `0x`-prefixed lowercase hex literal, one per line.
pub fn write_hex_lines<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    for b in bytes {
        writeln!(out, "{:#x}", b)?;
    }
    Ok(())
}
