//! Setting document metadata on the proof.

use pdf_writer::{Date, Pdf, Ref, TextStr};

/// Metadata written to the proof document's info dictionary.
#[derive(Debug, Default, Clone)]
pub struct Metadata {
    title: Option<String>,
    subject: Option<String>,
    creator: Option<String>,
    producer: Option<String>,
    creation_date: Option<Date>,
}

impl Metadata {
    /// Create new metadata.
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }

    /// The title of the document.
    pub fn title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    /// The subject of the document.
    pub fn subject(mut self, subject: String) -> Self {
        self.subject = Some(subject);
        self
    }

    /// The creator tool of the document.
    pub fn creator(mut self, creator: String) -> Self {
        self.creator = Some(creator);
        self
    }

    /// The producer tool of the document.
    pub fn producer(mut self, producer: String) -> Self {
        self.producer = Some(producer);
        self
    }

    /// The creation date of the document.
    pub fn creation_date(mut self, creation_date: Date) -> Self {
        self.creation_date = Some(creation_date);
        self
    }

    pub(crate) fn has_document_info(&self) -> bool {
        self.title.is_some()
            || self.subject.is_some()
            || self.creator.is_some()
            || self.producer.is_some()
            || self.creation_date.is_some()
    }

    pub(crate) fn serialize_document_info(&self, ref_: &mut Ref, pdf: &mut Pdf) {
        if self.has_document_info() {
            let ref_ = ref_.bump();
            let mut document_info = pdf.document_info(ref_);

            if let Some(title) = &self.title {
                document_info.title(TextStr(title));
            }

            if let Some(subject) = &self.subject {
                document_info.subject(TextStr(subject));
            }

            if let Some(creator) = &self.creator {
                document_info.creator(TextStr(creator));
            }

            if let Some(producer) = &self.producer {
                document_info.producer(TextStr(producer));
            }

            if let Some(date) = self.creation_date {
                document_info.creation_date(date);
            }
        }
    }
}
