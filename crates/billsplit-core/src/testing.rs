//! In-memory test PDFs built with lopdf.

use lopdf::{dictionary, Document, Object, Stream};

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Build a PDF with one page per entry; each page shows its lines of text
/// in Helvetica, top to bottom.
pub(crate) fn statement_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids = Vec::new();
    for lines in pages {
        let mut content = String::from("BT /F1 12 Tf 72 720 Td ");
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                content.push_str("0 -16 Td ");
            }
            content.push_str(&format!("({}) Tj ", escape(line)));
        }
        content.push_str("ET");

        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).expect("test PDF serializes");
    data
}

/// A structurally valid PDF whose page tree is empty.
pub(crate) fn empty_pdf() -> Vec<u8> {
    statement_pdf(&[])
}

/// A statement PDF whose trailer names an encryption handler that cannot be
/// opened without a password.
pub(crate) fn encrypted_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::load_mem(&statement_pdf(pages)).expect("test PDF loads");
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 5,
        "R" => 6,
        "Length" => 128,
        "P" => -4,
    });
    doc.trailer.set("Encrypt", encrypt_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).expect("test PDF serializes");
    data
}

/// Raw content stream of a page (zero-based), as text.
pub(crate) fn page_content(doc: &Document, page_index: usize) -> String {
    let pages = doc.get_pages();
    let page_id = pages
        .values()
        .nth(page_index)
        .copied()
        .expect("page exists");
    let content = doc.get_page_content(page_id).expect("page has content");
    String::from_utf8_lossy(&content).into_owned()
}
