//! Notification draft model.

use serde::{Deserialize, Serialize};

/// Subject/body content kept across sessions until explicitly reset.
///
/// `body` holds rich text (HTML) as typed in the composer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub subject: String,
    pub body: String,
}

impl Draft {
    /// Returns whether both subject and body are empty.
    pub fn is_empty(&self) -> bool {
        self.subject.is_empty() && self.body.is_empty()
    }
}
