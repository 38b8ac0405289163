//! Candidate upstream URLs for an identifier.

use crate::security::Identifier;

/// One (extension, URL) pair to try upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub extension: String,
    pub url: String,
}

impl Candidate {
    /// Build one candidate per extension, preserving priority order.
    pub fn for_identifier(id: &Identifier, extensions: &[String], base_url: &str) -> Vec<Self> {
        extensions
            .iter()
            .map(|ext| Self {
                extension: ext.clone(),
                url: format!("{}{}.{}", base_url, id, ext),
            })
            .collect()
    }
}
