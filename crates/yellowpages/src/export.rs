use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, WriterBuilder};

use crate::types::BusinessListing;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// CSV writer for listings. Every field is quoted and the header row is
/// written before the first record.
pub struct ListingWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> ListingWriter<W> {
    pub fn new(writer: W) -> Self {
        let inner = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(writer);
        Self { inner }
    }

    pub fn write(&mut self, listing: &BusinessListing) -> Result<(), ExportError> {
        self.inner.serialize(listing)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ExportError> {
        self.inner.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, ExportError> {
        self.inner
            .into_inner()
            .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
    }
}

/// Writes listings to a file that is only created once the first listing
/// arrives, so a scrape that finds nothing leaves nothing behind.
pub struct CsvSink {
    path: PathBuf,
    writer: Option<ListingWriter<File>>,
    written: usize,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn write_all<'a>(
        &mut self,
        listings: impl IntoIterator<Item = &'a BusinessListing>,
    ) -> Result<(), ExportError> {
        for listing in listings {
            self.write(listing)?;
        }
        self.flush()
    }

    pub fn write(&mut self, listing: &BusinessListing) -> Result<(), ExportError> {
        if self.writer.is_none() {
            log::info!("Writing scraped data to {}", self.path.display());
            let file = File::create(&self.path).map_err(|source| ExportError::Io {
                path: self.path.clone(),
                source,
            })?;
            self.writer = Some(ListingWriter::new(file));
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.write(listing)?;
            self.written += 1;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ExportError> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = r#""rank","business_name","telephone","business_page","category","website","rating","street","locality","region","zipcode","listing_url""#;

    fn listing() -> BusinessListing {
        BusinessListing {
            rank: Some("2".to_string()),
            business_name: Some("Café Crème & Crêpes".to_string()),
            telephone: None,
            business_page: Some("https://www.yellowpages.com/springfield-il/mip/cafe-creme-2002".to_string()),
            category: Some("Coffee Shops,Bakeries".to_string()),
            website: None,
            rating: Some("4".to_string()),
            street: Some("310 E Adams St".to_string()),
            locality: Some("Springfield".to_string()),
            region: Some("IL".to_string()),
            zipcode: Some("62701".to_string()),
            listing_url: "https://www.yellowpages.com/search?page=1".to_string(),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("yellowpages-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_writes_quoted_header_and_rows() {
        let mut writer = ListingWriter::new(Vec::new());
        writer.write(&listing()).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).expect("output should be UTF-8");

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], HEADER);
        assert_eq!(
            lines[1],
            r#""2","Café Crème & Crêpes","","https://www.yellowpages.com/springfield-il/mip/cafe-creme-2002","Coffee Shops,Bakeries","","4","310 E Adams St","Springfield","IL","62701","https://www.yellowpages.com/search?page=1""#
        );
    }

    #[test]
    fn test_sink_without_listings_creates_no_file() {
        let path = temp_path("empty.csv");
        let _ = fs::remove_file(&path);

        let mut sink = CsvSink::new(&path);
        sink.write_all(&[]).unwrap();

        assert_eq!(sink.written(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_sink_appends_across_batches() {
        let path = temp_path("batches.csv");
        let _ = fs::remove_file(&path);

        let mut sink = CsvSink::new(&path);
        sink.write_all(&[listing()]).unwrap();
        sink.write_all(&[listing(), listing()]).unwrap();
        assert_eq!(sink.written(), 3);

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], HEADER);
        assert!(lines[1..].iter().all(|l| l.contains("Café Crème & Crêpes")));

        fs::remove_file(&path).unwrap();
    }
}
