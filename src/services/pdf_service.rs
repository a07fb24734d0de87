//! PDF access
//!
//! Thin wrapper over `lopdf`: page count, page text, single-page extraction.
//! Page indices are 0-based everywhere in this crate; `lopdf` numbers pages
//! from 1 and the conversion happens here only.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lopdf::Document;
use tracing::info;

use crate::error::{AppError, PdfError};

/// Output folder created next to the source document
pub const EXTRACTED_PAGES_DIR: &str = "extracted_pages";
/// File name prefix of every extracted page
pub const PAGE_FILE_PREFIX: &str = "LHC_page_";

/// A loaded PDF document
pub struct PdfDocument {
    path: PathBuf,
    document: Document,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self> {
        let document = Document::load(path).map_err(|source| {
            AppError::from(PdfError::LoadFailed {
                path: path.to_path_buf(),
                source,
            })
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Extracted text of page `index` (0-based)
    pub fn page_text(&self, index: usize) -> Result<String> {
        let page = self.page_number(index)?;
        let text = self.document.extract_text(&[page]).map_err(|source| {
            AppError::from(PdfError::TextExtractionFailed { page, source })
        })?;
        Ok(text)
    }

    /// Write page `index` (0-based) as a standalone one-page document
    pub fn write_page(&self, index: usize, output: &Path) -> Result<()> {
        let keep = self.page_number(index)?;
        let others: Vec<u32> = self
            .document
            .get_pages()
            .keys()
            .copied()
            .filter(|&n| n != keep)
            .collect();

        let mut single = self.document.clone();
        single.delete_pages(&others);
        single.prune_objects();
        single.save(output).map_err(|e| {
            AppError::from(PdfError::WriteFailed {
                page: keep,
                path: output.to_path_buf(),
                message: e.to_string(),
            })
        })?;

        Ok(())
    }

    fn page_number(&self, index: usize) -> Result<u32> {
        let page_count = self.page_count();
        if index >= page_count {
            return Err(AppError::from(PdfError::PageOutOfRange { index, page_count }).into());
        }
        Ok(index as u32 + 1)
    }
}

/// File name of extracted page `page_number` (1-based)
pub fn page_file_name(page_number: usize) -> String {
    format!("{}{}.pdf", PAGE_FILE_PREFIX, page_number)
}

/// Split `file` into one document per page under `<out_dir>/extracted_pages/`
///
/// # Returns
/// Paths of the written pages, in page order
pub fn split_pdf(file: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let output_folder = out_dir.join(EXTRACTED_PAGES_DIR);
    fs::create_dir_all(&output_folder)
        .map_err(|e| AppError::file_write_failed(&output_folder, e))?;

    let document = PdfDocument::open(file)?;
    let mut written = Vec::with_capacity(document.page_count());

    for index in 0..document.page_count() {
        let filename = output_folder.join(page_file_name(index + 1));
        document
            .write_page(index, &filename)
            .with_context(|| format!("cannot extract page {} of {}", index + 1, file.display()))?;

        info!(
            "Extracted page {} from {} and saved as {}",
            index + 1,
            file.display(),
            filename.display()
        );
        written.push(filename);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_file_name_is_one_based() {
        assert_eq!(page_file_name(1), "LHC_page_1.pdf");
        assert_eq!(page_file_name(29), "LHC_page_29.pdf");
    }

    #[test]
    fn test_open_missing_file_is_load_error() {
        let err = PdfDocument::open(Path::new("/nonexistent/LHC.pdf"))
            .err()
            .expect("missing file must fail");
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Pdf(PdfError::LoadFailed { .. }))
        ));
    }

    #[test]
    fn test_open_garbage_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a.pdf");
        fs::write(&path, "plain text, no pdf header").unwrap();
        assert!(PdfDocument::open(&path).is_err());
    }
}
