// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zone serialization.
//!
//! Zones are written as a list of polygons, each a list of `[x, y]` pairs,
//! in YAML or JSON depending on the file extension. The same shape can be
//! read back as a [`PolygonCollection`].

use crate::models::annotation::PolygonCollection;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Output format, picked from the destination's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Format::Yaml,
            _ => Format::Json,
        }
    }
}

fn encode(zones: &PolygonCollection, format: Format) -> Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string(zones)?,
        Format::Yaml => serde_yaml::to_string(zones)?,
    })
}

/// Write `zones` to `path`.
///
/// The document is encoded in memory, written to a temporary file next to
/// the destination and renamed into place, so `path` is either left as it
/// was or holds the complete document.
pub fn save_zones(zones: &PolygonCollection, path: &Path) -> Result<()> {
    let document = encode(zones, Format::for_path(path))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .with_context(|| format!("Output path has no file name: {}", path.display()))?;
    let tmp_path = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));

    let written = (|| -> Result<()> {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(document.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if written.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    written.with_context(|| format!("Failed to write zones to {}", path.display()))
}
