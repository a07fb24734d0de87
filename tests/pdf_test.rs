mod common;

use ganga_genai::error::{AppError, PdfError};
use ganga_genai::services::{count_word, split_pdf, PdfDocument};

#[test]
fn test_split_pdf_writes_one_file_per_page() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("LHC.pdf");
    let pages: Vec<String> = (1..=29).map(|n| format!("page {}", n)).collect();
    let page_refs: Vec<&str> = pages.iter().map(String::as_str).collect();
    common::write_pdf(&pdf, &page_refs);

    let written = split_pdf(&pdf, dir.path()).unwrap();

    assert_eq!(written.len(), 29);
    for n in 1..=29 {
        let page = dir
            .path()
            .join("extracted_pages")
            .join(format!("LHC_page_{}.pdf", n));
        assert!(page.exists(), "missing {}", page.display());
        assert_eq!(PdfDocument::open(&page).unwrap().page_count(), 1);
    }
}

#[test]
fn test_count_word_per_page() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("LHC.pdf");
    common::write_lhc_pdf(&pdf);

    assert_eq!(count_word(&pdf, 0, "hadron").unwrap(), 2);
    assert_eq!(count_word(&pdf, 1, "hadron").unwrap(), 0);
    assert_eq!(count_word(&pdf, 2, "it").unwrap(), 2);
}

#[test]
fn test_page_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("LHC.pdf");
    common::write_lhc_pdf(&pdf);

    let err = count_word(&pdf, 3, "hadron").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AppError>(),
        Some(AppError::Pdf(PdfError::PageOutOfRange {
            index: 3,
            page_count: 3
        }))
    ));
}
