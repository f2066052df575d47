use std::path::Path;

use crate::logging;
use crate::model::Entry;

const BOM: char = '\u{feff}';
const CONNECT_KEY: &str = "Connect";
const CONNECT_PREFIX: &str = "Connect=";

/// Parses the 1C starter list. A `[name]` header only yields an entry when the very
/// next line is its `Connect=` line; everything else in the file is ignored.
/// Entries come back in file order, repeats included; `EntryStore` settles duplicates.
pub fn parse_ibases(text: &str) -> Vec<Entry> {
    let lines: Vec<&str> = text.trim_start_matches(BOM).trim().lines().collect();

    let mut entries: Vec<Entry> = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if !line.starts_with('[') {
            continue;
        }

        let Some(next) = lines.get(index + 1) else {
            continue;
        };
        if !next.starts_with(CONNECT_KEY) {
            continue;
        }

        let name = header_name(line);
        if name.is_empty() {
            continue;
        }
        let connection = next.replacen(CONNECT_PREFIX, "", 1).trim().to_string();

        entries.push(Entry { name, connection });
    }

    entries
}

/// Reads and parses the list at `path`. A missing or unreadable file is an empty list.
pub fn load_ibases(path: &Path) -> Vec<Entry> {
    if !path.exists() {
        return Vec::new();
    }

    match std::fs::read(path) {
        Ok(bytes) => parse_ibases(&String::from_utf8_lossy(&bytes)),
        Err(error) => {
            logging::warn(
                "ibases list unreadable",
                &[
                    ("path", path.display().to_string()),
                    ("error", error.to_string()),
                ],
            );
            Vec::new()
        }
    }
}

fn header_name(line: &str) -> String {
    line.replacen('[', "", 1).replacen(']', "", 1).trim().to_string()
}
