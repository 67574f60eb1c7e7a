//! PDF outline (bookmark) embedding built on top of `lopdf`.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

use crate::builder::SectionMark;

/// Errors that can occur while embedding bookmarks into a rendered PDF document.
#[derive(Debug, Error)]
pub enum BookmarkError {
    /// The PDF bytes could not be parsed by `lopdf`.
    #[error("failed to parse PDF bytes: {0}")]
    Parse(#[from] lopdf::Error),
    /// The outlined document could not be serialized again.
    #[error("failed to write the outlined PDF: {0}")]
    Write(#[from] std::io::Error),
    /// A required catalog entry was missing from the document trailer.
    #[error("PDF catalog entry is missing")]
    MissingCatalog,
    /// The catalog object was not a dictionary, preventing outline injection.
    #[error("PDF catalog entry is not a dictionary")]
    InvalidCatalog,
    /// A recorded section page does not exist in the rendered document.
    #[error("section '{title}' refers to missing page {page_number} for bookmark destination")]
    MissingPage {
        /// Title of the section whose page is missing.
        title: String,
        /// The requested (1-indexed) page number that could not be resolved.
        page_number: usize,
    },
}

/// Adds a flat outline with one `/Dest [page /Fit]` entry per section mark.
pub fn apply_section_bookmarks(
    pdf_bytes: &[u8],
    marks: &[SectionMark],
) -> Result<Vec<u8>, BookmarkError> {
    if marks.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();
    let mut outline_entries = collect_outline_entries(&mut document, marks, &pages)?;

    let outlines_id = document.new_object_id();
    link_outline_entries(outlines_id, &mut document, &mut outline_entries);
    insert_outlines_root(outlines_id, &mut document, &outline_entries)?;

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

struct OutlineEntry {
    object_id: ObjectId,
    page_ref: ObjectId,
    title: String,
}

fn collect_outline_entries(
    document: &mut Document,
    marks: &[SectionMark],
    pages: &BTreeMap<u32, ObjectId>,
) -> Result<Vec<OutlineEntry>, BookmarkError> {
    marks
        .iter()
        .map(|mark| {
            let page_ref = u32::try_from(mark.page)
                .ok()
                .and_then(|page| pages.get(&page))
                .copied()
                .ok_or_else(|| BookmarkError::MissingPage {
                    title: mark.title.clone(),
                    page_number: mark.page,
                })?;
            Ok(OutlineEntry {
                object_id: document.new_object_id(),
                page_ref,
                title: mark.title.clone(),
            })
        })
        .collect()
}

fn link_outline_entries(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &mut [OutlineEntry],
) {
    for index in 0..entries.len() {
        let mut dictionary = Dictionary::new();
        dictionary.set(
            "Title",
            Object::string_literal(entries[index].title.as_str()),
        );
        dictionary.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(entries[index].page_ref),
                Object::Name("Fit".into()),
            ]),
        );
        dictionary.set("Parent", Object::Reference(outlines_id));

        if index > 0 {
            dictionary.set("Prev", Object::Reference(entries[index - 1].object_id));
        }

        if index + 1 < entries.len() {
            dictionary.set("Next", Object::Reference(entries[index + 1].object_id));
        }

        document
            .objects
            .insert(entries[index].object_id, Object::Dictionary(dictionary));
    }
}

fn insert_outlines_root(
    outlines_id: ObjectId,
    document: &mut Document,
    entries: &[OutlineEntry],
) -> Result<(), BookmarkError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;

    let catalog = document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?;

    catalog.set("Outlines", Object::Reference(outlines_id));

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Outlines".into()));
    dictionary.set("Count", Object::Integer(entries.len() as i64));
    if let Some(first) = entries.first() {
        dictionary.set("First", Object::Reference(first.object_id));
    }
    if let Some(last) = entries.last() {
        dictionary.set("Last", Object::Reference(last.object_id));
    }

    document
        .objects
        .insert(outlines_id, Object::Dictionary(dictionary));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn two_page_pdf() -> Vec<u8> {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let kids: Vec<Object> = (0..2)
            .map(|_| {
                document
                    .add_object(dictionary! {
                        "Type" => "Page",
                        "Parent" => pages_id,
                        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                    })
                    .into()
            })
            .collect();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => 2,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        document.save_to(&mut bytes).unwrap();
        bytes
    }

    fn mark(title: &str, page: usize) -> SectionMark {
        SectionMark {
            title: title.into(),
            page,
        }
    }

    #[test]
    fn outline_lists_every_section() {
        let bytes = apply_section_bookmarks(
            &two_page_pdf(),
            &[mark("Project Definition", 1), mark("User Flow", 2)],
        )
        .unwrap();

        let document = Document::load_mem(&bytes).unwrap();
        let catalog_id = document
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .unwrap();
        let catalog = document.get_dictionary(catalog_id).unwrap();
        let outlines_id = catalog.get(b"Outlines").and_then(Object::as_reference).unwrap();
        let outlines = document.get_dictionary(outlines_id).unwrap();
        assert_eq!(outlines.get(b"Count").and_then(Object::as_i64).unwrap(), 2);
    }

    #[test]
    fn missing_page_is_reported() {
        let err = apply_section_bookmarks(&two_page_pdf(), &[mark("Appendix", 5)]).unwrap_err();
        assert!(matches!(err, BookmarkError::MissingPage { page_number: 5, .. }));
        assert_eq!(
            err.to_string(),
            "section 'Appendix' refers to missing page 5 for bookmark destination"
        );
    }

    #[test]
    fn unparsable_bytes_keep_the_lopdf_source() {
        use std::error::Error as _;

        let err = apply_section_bookmarks(b"not a pdf", &[mark("Overview", 1)]).unwrap_err();
        assert!(matches!(err, BookmarkError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse PDF bytes: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn no_marks_leaves_bytes_untouched() {
        let bytes = two_page_pdf();
        assert_eq!(apply_section_bookmarks(&bytes, &[]).unwrap(), bytes);
    }
}
