use serde::de::Error as _;
use serde::{Deserialize, Serialize};

use crate::identifier::CustomerIdentifier;

/// One row of the master customer list.
///
/// The identifier is read from `gduns`, falling back to `gdun` and then `id`.
/// Any other fields the list carries are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MasterListEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gduns: Option<CustomerIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdun: Option<CustomerIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CustomerIdentifier>,
}

impl MasterListEntry {
    pub fn identifier(self) -> Option<CustomerIdentifier> {
        self.gduns.or(self.gdun).or(self.id)
    }
}

/// Parses the master list document and extracts identifiers in list order.
///
/// The document must be a JSON array; a single malformed entry rejects the
/// whole list so a cycle never runs against a partial list.
pub fn parse_master_list(body: &[u8]) -> Result<Vec<CustomerIdentifier>, serde_json::Error> {
    let entries: Vec<MasterListEntry> = serde_json::from_slice(body)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            entry.identifier().ok_or_else(|| {
                serde_json::Error::custom(format!(
                    "master list entry {index} has no gduns, gdun or id field"
                ))
            })
        })
        .collect()
}
