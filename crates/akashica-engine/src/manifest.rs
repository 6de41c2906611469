//! Directory manifest codec.
//!
//! A manifest is a newline-delimited, sorted sequence of records
//! `HASH:SIZE:NAME`, where `NAME` carries a trailing `/` iff the entry is
//! a directory. An empty directory serializes to zero bytes.

use akashica_core::{EntryKind, Error, ManifestEntry, Result};

/// Parse manifest bytes into entries, sorted by name.
pub fn parse(bytes: &[u8]) -> Result<Vec<ManifestEntry>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::InvalidManifest(format!("not valid utf-8: {e}")))?;

    let mut entries = Vec::new();
    for line in text.split('\n') {
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(3, ':');
        let hash = parts
            .next()
            .ok_or_else(|| Error::InvalidManifest(format!("malformed record: {line}")))?;
        let size = parts
            .next()
            .ok_or_else(|| Error::InvalidManifest(format!("malformed record: {line}")))?;
        let name = parts
            .next()
            .ok_or_else(|| Error::InvalidManifest(format!("malformed record: {line}")))?;

        let size: u64 = size
            .parse()
            .map_err(|e| Error::InvalidManifest(format!("bad size in {line}: {e}")))?;

        let (kind, name) = if let Some(stripped) = name.strip_suffix('/') {
            (EntryKind::Directory, stripped.to_string())
        } else {
            (EntryKind::File, name.to_string())
        };

        entries.push(ManifestEntry {
            name,
            hash: hash.to_string(),
            size,
            kind,
        });
    }
    Ok(entries)
}

/// Serialize entries into canonical manifest bytes: one record per
/// entry, sorted lexicographically by the full serialized line, `\n`
/// terminated with no trailing newline on the last record.
pub fn serialize(entries: &[ManifestEntry]) -> Vec<u8> {
    let mut lines: Vec<String> = entries.iter().map(record_line).collect();
    lines.sort();
    lines.join("\n").into_bytes()
}

fn record_line(entry: &ManifestEntry) -> String {
    let suffix = match entry.kind {
        EntryKind::Directory => "/",
        EntryKind::File => "",
    };
    format!("{}:{}:{}{}", entry.hash, entry.size, entry.name, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, hash: &str, size: u64, kind: EntryKind) -> ManifestEntry {
        ManifestEntry {
            name: name.to_string(),
            hash: hash.to_string(),
            size,
            kind,
        }
    }

    #[test]
    fn empty_directory_serializes_to_zero_bytes() {
        assert_eq!(serialize(&[]), Vec::<u8>::new());
    }

    #[test]
    fn roundtrip_single_file() {
        let entries = vec![entry(
            "a.txt",
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
            1,
            EntryKind::File,
        )];
        let bytes = serialize(&entries);
        assert_eq!(
            bytes,
            b"2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824:1:a.txt"
        );
        assert_eq!(parse(&bytes).unwrap(), entries);
    }

    #[test]
    fn directory_entry_has_trailing_slash() {
        let entries = vec![entry("sub", "abc123", 42, EntryKind::Directory)];
        let bytes = serialize(&entries);
        assert_eq!(bytes, b"abc123:42:sub/");
        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed[0].kind, EntryKind::Directory);
        assert_eq!(parsed[0].name, "sub");
    }

    #[test]
    fn names_with_colons_round_trip() {
        let entries = vec![entry("a:b:c.txt", "deadbeef", 3, EntryKind::File)];
        let bytes = serialize(&entries);
        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed[0].name, "a:b:c.txt");
    }

    #[test]
    fn entries_sort_canonically() {
        let entries = vec![
            entry("zeta.txt", "h1", 1, EntryKind::File),
            entry("alpha.txt", "h2", 2, EntryKind::File),
        ];
        let bytes = serialize(&entries);
        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed[0].name, "alpha.txt");
        assert_eq!(parsed[1].name, "zeta.txt");
    }

    #[test]
    fn identical_entry_sets_produce_identical_bytes() {
        let a = vec![
            entry("b.txt", "h1", 1, EntryKind::File),
            entry("a.txt", "h2", 2, EntryKind::File),
        ];
        let b = vec![
            entry("a.txt", "h2", 2, EntryKind::File),
            entry("b.txt", "h1", 1, EntryKind::File),
        ];
        assert_eq!(serialize(&a), serialize(&b));
    }
}
