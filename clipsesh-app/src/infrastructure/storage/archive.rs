use std::collections::HashMap;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const COMPRESSION_LEVEL: i64 = 6;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive io: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive format: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Zip writer that hands out unique entry names.
///
/// Owned by value so it can be moved onto the blocking pool for each write
/// and handed back afterwards.
pub struct ZipSink<W: Write + Seek> {
    writer: ZipWriter<W>,
    seen: HashMap<String, u32>,
}

impl<W: Write + Seek> ZipSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: ZipWriter::new(inner),
            seen: HashMap::new(),
        }
    }

    /// Write one entry and return the name it was stored under.
    pub fn append(&mut self, name: &str, data: &[u8]) -> Result<String, ArchiveError> {
        let unique = self.unique_name(name);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL));

        self.writer.start_file(unique.as_str(), options)?;
        self.writer.write_all(data)?;
        Ok(unique)
    }

    /// Write the central directory and give back the underlying writer.
    pub fn finish(self) -> Result<W, ArchiveError> {
        Ok(self.writer.finish()?)
    }

    fn unique_name(&mut self, name: &str) -> String {
        let mut candidate = name.to_string();
        while let Some(n) = self.seen.get(&candidate).copied() {
            let next = n + 1;
            self.seen.insert(candidate.clone(), next);
            candidate = match name.rsplit_once('.') {
                Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({next}).{ext}"),
                _ => format!("{name} ({next})"),
            };
        }
        self.seen.insert(candidate.clone(), 0);
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn duplicate_names_get_suffixes() {
        let mut sink = ZipSink::new(Cursor::new(Vec::new()));
        assert_eq!(sink.append("3-a-b.mp4", b"one").unwrap(), "3-a-b.mp4");
        assert_eq!(sink.append("3-a-b.mp4", b"two").unwrap(), "3-a-b (1).mp4");
        assert_eq!(sink.append("3-a-b.mp4", b"three").unwrap(), "3-a-b (2).mp4");

        let bytes = sink.finish().unwrap().into_inner();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);

        let mut contents = String::new();
        archive
            .by_name("3-a-b (1).mp4")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "two");
    }
}
