use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// A source PDF opened read-only for the duration of a run.
pub struct PdfDocument {
    pub doc: Document,
    #[allow(dead_code)]
    pub path: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let doc =
            Document::load(&path).with_context(|| format!("Failed to open PDF: {}", path_str))?;
        Ok(PdfDocument {
            doc,
            path: path_str,
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    /// Extract specific pages to a new document
    pub fn extract_pages(&self, pages: &[u32]) -> Result<Document> {
        let mut new_doc = self.doc.clone();
        let all_pages = self.page_ids();
        let total = all_pages.len() as u32;

        // Validate page numbers
        for &page in pages {
            if page == 0 || page > total {
                anyhow::bail!("Page {} is out of range (1-{})", page, total);
            }
        }

        // Get page numbers to delete (pages NOT in our list)
        let pages_to_delete: Vec<u32> = all_pages
            .iter()
            .filter(|(num, _)| !pages.contains(num))
            .map(|(num, _)| *num)
            .collect();

        // Delete pages not in our list
        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
        }

        Ok(new_doc)
    }
}

/// An output PDF under construction. Pages are only ever appended; `save`
/// consumes the builder and commits it to disk.
pub struct OutputDocument {
    inner: Option<Document>,
}

impl OutputDocument {
    pub fn new() -> Self {
        OutputDocument { inner: None }
    }

    /// Append every page of `doc` (typically a single extracted page) to
    /// this document, in order.
    pub fn append(&mut self, doc: Document) {
        match &mut self.inner {
            None => self.inner = Some(doc),
            Some(base) => append_pages(base, &doc),
        }
    }

    pub fn page_count(&self) -> u32 {
        self.inner
            .as_ref()
            .map_or(0, |doc| doc.get_pages().len() as u32)
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<()> {
        let mut doc = self
            .inner
            .context("Cannot save an output document with no pages")?;
        doc.save(&path)
            .with_context(|| format!("Failed to save PDF: {}", path.as_ref().display()))?;
        Ok(())
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Append the pages of `doc` to `base` by copying their page objects under
/// fresh object IDs and registering them in the base page tree.
fn append_pages(base: &mut Document, doc: &Document) {
    for (_, page_id) in doc.get_pages() {
        // Renumber object IDs to avoid conflicts
        let new_id = (base.max_id + 1, 0);
        base.max_id += 1;

        let Ok(page_obj) = doc.get_object(page_id) else {
            continue;
        };
        base.objects.insert(new_id, page_obj.clone());

        // Register the copied page in the Pages tree
        let pages_id = match base.catalog().ok().and_then(|c| c.get(b"Pages").ok()) {
            Some(Object::Reference(id)) => Some(*id),
            _ => None,
        };
        if let Some(pages_id) = pages_id {
            if let Ok(pages_dict) = base.get_dictionary_mut(pages_id) {
                if let Ok(Object::Array(kids)) = pages_dict.get_mut(b"Kids") {
                    kids.push(Object::Reference(new_id));
                }
                if let Ok(Object::Integer(count)) = pages_dict.get_mut(b"Count") {
                    *count += 1;
                }
            }
        }
    }
}

/// Build a minimal but well-formed in-memory document with the given page
/// count, for tests that need real page trees without binary fixtures.
#[cfg(test)]
pub(crate) fn fixture_document(pages: u32) -> Document {
    use lopdf::dictionary;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for _ in 0..pages {
        let content_id = doc.add_object(lopdf::Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! {},
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}
