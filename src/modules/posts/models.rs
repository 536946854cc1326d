use serde::Deserialize;

pub use quill_db::{NewPost, Post, PostId};

/// Fields submitted by the edit form, URL-encoded.
///
/// Both are optional at the decoding stage so a missing one can be reported
/// by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditForm {
    pub title: Option<String>,
    pub body: Option<String>,
}
