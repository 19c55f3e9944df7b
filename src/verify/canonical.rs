//! Canonical row encoding for content hashing.
//!
//! A row becomes a compact JSON object whose keys follow the statement's
//! column order, which `SELECT *` takes from the table declaration. Values are
//! written the way the snapshot producer wrote them when it recorded
//! `snapshot_hash`, so stored digests stay comparable:
//!
//! | SQLite value | encoding                                   |
//! |--------------|--------------------------------------------|
//! | NULL         | `null`                                     |
//! | INTEGER      | decimal                                    |
//! | REAL         | shortest round-trip, `3` not `3.0`, `1e+21`|
//! | TEXT         | JSON string                                |
//! | BLOB         | `{"type":"Buffer","data":[..]}`            |

use std::io::Write;

use rusqlite::types::ValueRef;
use rusqlite::Row;

use crate::error::Result;

pub fn encode_row(out: &mut Vec<u8>, columns: &[String], row: &Row<'_>) -> Result<()> {
    out.push(b'{');
    for (idx, name) in columns.iter().enumerate() {
        if idx > 0 {
            out.push(b',');
        }
        write_str(out, name)?;
        out.push(b':');
        encode_value(out, row.get_ref(idx)?)?;
    }
    out.push(b'}');
    Ok(())
}

pub fn encode_value(out: &mut Vec<u8>, value: ValueRef<'_>) -> Result<()> {
    match value {
        ValueRef::Null => out.extend_from_slice(b"null"),
        ValueRef::Integer(i) => write!(out, "{i}")?,
        ValueRef::Real(f) => write_real(out, f)?,
        ValueRef::Text(bytes) => write_str(out, &String::from_utf8_lossy(bytes))?,
        ValueRef::Blob(bytes) => {
            out.extend_from_slice(br#"{"type":"Buffer","data":["#);
            for (idx, b) in bytes.iter().enumerate() {
                if idx > 0 {
                    out.push(b',');
                }
                write!(out, "{b}")?;
            }
            out.extend_from_slice(b"]}");
        }
    }
    Ok(())
}

fn write_str(out: &mut Vec<u8>, s: &str) -> Result<()> {
    serde_json::to_writer(&mut *out, s).map_err(std::io::Error::from)?;
    Ok(())
}

fn write_real(out: &mut Vec<u8>, f: f64) -> Result<()> {
    if !f.is_finite() {
        out.extend_from_slice(b"null");
        return Ok(());
    }
    // -0.0 included
    if f == 0.0 {
        out.push(b'0');
        return Ok(());
    }

    let abs = f.abs();
    if (1e-6..1e21).contains(&abs) {
        write!(out, "{f}")?;
        return Ok(());
    }

    let exp = format!("{f:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => write!(out, "{mantissa}e+{power}")?,
        _ => out.extend_from_slice(exp.as_bytes()),
    }
    Ok(())
}
