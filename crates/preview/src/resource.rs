//! Temporary document resources backing the rendering surface.
//! （渲染區所使用的暫存文件資源。）
//!
//! A [`ResourceHandle`] is the Rust counterpart of a blob URL: an opaque,
//! short-lived reference to an in-memory document. Handles are not `Clone`;
//! revoking one consumes it, so the same handle can never be released twice.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Identifier of one preview run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque reference to a live document resource.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    id: u64,
    session: SessionId,
    url: String,
}

impl ResourceHandle {
    pub fn new(id: u64, session: SessionId, url: impl Into<String>) -> Self {
        Self {
            id,
            session,
            url: url.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Creates and releases document resources.
/// （建立與釋放文件資源。）
pub trait ResourceStore {
    /// Materializes `document` and returns a handle for it.
    fn create(&mut self, session: SessionId, document: String) -> ResourceHandle;

    /// Releases the resource behind `handle`. Returns `false` if the store did
    /// not know the handle.
    fn revoke(&mut self, handle: ResourceHandle) -> bool;

    /// Document text behind a handle, when the store can provide it.
    fn fetch(&self, handle: &ResourceHandle) -> Option<&str>;

    /// Number of resources currently alive.
    fn live_count(&self) -> usize;
}

/// In-memory blob store handing out `blob:codegenius/<n>` URLs.
#[derive(Debug, Default)]
pub struct BlobStore {
    documents: HashMap<u64, String>,
    next_id: u64,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a blob URL the way a browser would for an `<iframe src>`.
    pub fn resolve(&self, url: &str) -> Option<&str> {
        let id = url.strip_prefix("blob:codegenius/")?.parse::<u64>().ok()?;
        self.documents.get(&id).map(String::as_str)
    }
}

impl ResourceStore for BlobStore {
    fn create(&mut self, session: SessionId, document: String) -> ResourceHandle {
        self.next_id += 1;
        let id = self.next_id;
        let url = format!("blob:codegenius/{id}");
        debug!(%session, %url, bytes = document.len(), "created preview resource");
        self.documents.insert(id, document);
        ResourceHandle::new(id, session, url)
    }

    fn revoke(&mut self, handle: ResourceHandle) -> bool {
        if self.documents.remove(&handle.id).is_some() {
            debug!(url = %handle.url, "revoked preview resource");
            true
        } else {
            warn!(url = %handle.url, "revoke of unknown preview resource");
            false
        }
    }

    fn fetch(&self, handle: &ResourceHandle) -> Option<&str> {
        self.documents.get(&handle.id).map(String::as_str)
    }

    fn live_count(&self) -> usize {
        self.documents.len()
    }
}

/// Capability set granted to the preview `<iframe>`.
/// （預覽 iframe 所授予的權限集合。）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxPolicy {
    tokens: &'static [&'static str],
}

impl SandboxPolicy {
    /// Scripts, same-origin rendering, forms and modal dialogs. Nothing else.
    pub const PREVIEW: SandboxPolicy = SandboxPolicy {
        tokens: &[
            "allow-scripts",
            "allow-modals",
            "allow-same-origin",
            "allow-forms",
        ],
    };

    pub fn allows(&self, token: &str) -> bool {
        self.tokens.contains(&token)
    }

    /// Value for the `sandbox` attribute.
    pub fn attribute(&self) -> String {
        self.tokens.join(" ")
    }

    /// Markup a web host can embed to display `handle`.
    pub fn embed_tag(&self, handle: &ResourceHandle) -> String {
        format!(
            r#"<iframe src="{}" title="preview" sandbox="{}"></iframe>"#,
            handle.url(),
            self.attribute()
        )
    }
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self::PREVIEW
    }
}
