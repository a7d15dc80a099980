//! Per-user session state: credential and the processed document.

use rag_store::VectorIndex;
use serde::Serialize;

use crate::{api_types::DocumentSummary, credential::Credential};

/// The processed upload. `index` is `None` when the text yielded no chunks.
#[derive(Debug)]
pub(crate) struct LoadedDocument {
    pub(crate) summary: DocumentSummary,
    pub(crate) index: Option<VectorIndex>,
}

/// State of one interactive session.
#[derive(Debug, Default)]
pub struct Session {
    credential: Option<Credential>,
    pub(crate) document: Option<LoadedDocument>,
}

/// Serializable view of a [`Session`]; never contains the secret.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub has_credential: bool,
    /// Redacted credential, e.g. `sk-…abcd`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_hint: Option<String>,
    pub document: Option<DocumentSummary>,
}

impl Session {
    pub fn new(credential: Option<Credential>) -> Self {
        Self {
            credential,
            document: None,
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Replaces the credential; `None` removes it.
    pub fn set_credential(&mut self, credential: Option<Credential>) {
        self.credential = credential;
    }

    pub fn document(&self) -> Option<&DocumentSummary> {
        self.document.as_ref().map(|d| &d.summary)
    }

    /// Drops the document and its index.
    pub fn drop_document(&mut self) {
        self.document = None;
    }

    /// Forgets everything, as a page reload would.
    pub fn clear(&mut self) {
        self.credential = None;
        self.document = None;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            has_credential: self.credential.is_some(),
            credential_hint: self.credential.as_ref().map(Credential::redacted),
            document: self.document().cloned(),
        }
    }
}
