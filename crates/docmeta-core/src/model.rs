//! # Catalog Data Model
//!
//! Typed views of the three kinds of catalog documents:
//!
//! - example metadata files (`metadata/*_metadata.yaml`): a mapping from
//!   record key (`<service>_<Operation>`) to [`MetadataRecord`];
//! - `sdks.yaml`: a mapping from SDK name to [`SdkEntry`];
//! - `services.yaml`: a mapping from service name to [`ServiceEntry`].
//!
//! The structs are deliberately lenient (`#[serde(default)]`, unknown
//! fields ignored). Strictness is the schema's job; these types exist so
//! cross-record checks and downstream renderers can work with names instead
//! of JSON pointers.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;

/// One documented code example.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataRecord {
    /// Full title, shown as the heading of the example.
    pub title: Option<String>,
    /// Short title, used in tables of contents.
    pub title_abbrev: Option<String>,
    /// One-sentence summary. Completes "Shows how to ...".
    pub synopsis: Option<String>,
    /// Steps of a scenario, one sentence each.
    pub synopsis_list: Vec<String>,
    /// Grouping for the rendered page, e.g. `Actions` or `Scenarios`.
    pub category: Option<String>,
    /// Developer guide page the example belongs with.
    pub guide_topic: Option<GuideTopic>,
    /// SDK name to the versions of that SDK the example exists for.
    pub languages: BTreeMap<String, Language>,
    /// Service name to the operations the example exercises.
    pub services: BTreeMap<String, OperationSet>,
}

impl MetadataRecord {
    /// Every free-text field of the record, paired with its field path
    /// relative to the record.
    ///
    /// Excerpt descriptions are included, so entity and style checks can
    /// cover all prose in one pass.
    pub fn text_fields(&self) -> Vec<(String, &str)> {
        let mut fields = Vec::new();
        if let Some(title) = &self.title {
            fields.push(("/title".to_string(), title.as_str()));
        }
        if let Some(abbrev) = &self.title_abbrev {
            fields.push(("/title_abbrev".to_string(), abbrev.as_str()));
        }
        if let Some(synopsis) = &self.synopsis {
            fields.push(("/synopsis".to_string(), synopsis.as_str()));
        }
        for (i, item) in self.synopsis_list.iter().enumerate() {
            fields.push((format!("/synopsis_list/{i}"), item.as_str()));
        }
        for (sdk, language) in &self.languages {
            for (v, version) in language.versions.iter().enumerate() {
                for (e, excerpt) in version.excerpts.iter().enumerate() {
                    if let Some(description) = &excerpt.description {
                        fields.push((
                            format!(
                                "/languages/{}/versions/{v}/excerpts/{e}/description",
                                escape_pointer(sdk)
                            ),
                            description.as_str(),
                        ));
                    }
                }
            }
        }
        fields
    }

    /// Services named by the record, including each version block's
    /// `add_services`.
    pub fn all_services(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.services.keys().map(String::as_str).collect();
        for language in self.languages.values() {
            for version in &language.versions {
                names.extend(version.add_services.keys().map(String::as_str));
            }
        }
        names
    }
}

/// Link to a developer guide topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideTopic {
    /// Link text.
    pub title: String,
    /// Path relative to the documentation host, or an absolute URL.
    pub url: Option<String>,
}

/// The versions of one SDK an example covers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Language {
    /// In document order.
    pub versions: Vec<VersionBlock>,
}

/// One SDK version's rendition of an example.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionBlock {
    /// Major version of the SDK.
    pub sdk_version: u32,
    /// Repository path of the example code.
    pub github: Option<String>,
    /// Link into the SDK developer guide.
    pub sdkguide: Option<String>,
    /// Prewritten content file in the cross-content directory, used
    /// instead of excerpts.
    pub block_content: Option<String>,
    /// Excerpts in render order.
    pub excerpts: Vec<Excerpt>,
    /// Services used by this version beyond the record's `services`.
    pub add_services: BTreeMap<String, OperationSet>,
}

/// A described, ordered group of code snippets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Excerpt {
    /// Prose shown above the snippets.
    pub description: Option<String>,
    /// Snippet tag identifiers, in render order.
    pub snippet_tags: Vec<String>,
    /// Paths of whole files shown instead of, or alongside, tagged snippets.
    pub snippet_files: Vec<String>,
}

/// A set of operation names.
///
/// Authors write these as YAML flow sets (`{GetObject, PutObject}`, which
/// parse as a mapping with null values), as sequences, or leave them empty.
/// All three forms are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOperationSet", into = "Vec<String>")]
pub struct OperationSet(BTreeSet<String>);

impl OperationSet {
    /// Whether `operation` is in the set.
    pub fn contains(&self, operation: &str) -> bool {
        self.0.contains(operation)
    }

    /// Operations in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no operations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for OperationSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<OperationSet> for Vec<String> {
    fn from(set: OperationSet) -> Self {
        set.0.into_iter().collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOperationSet {
    Set(BTreeMap<String, Value>),
    List(Vec<String>),
    Empty(()),
}

impl From<RawOperationSet> for OperationSet {
    fn from(raw: RawOperationSet) -> Self {
        match raw {
            RawOperationSet::Set(map) => map.into_keys().collect(),
            RawOperationSet::List(list) => list.into_iter().collect(),
            RawOperationSet::Empty(()) => Self::default(),
        }
    }
}

/// One entry of `sdks.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkEntry {
    /// Syntax-highlighting language for the SDK's snippets.
    pub property: Option<String>,
    /// Supported major versions.
    pub sdk: BTreeMap<u32, SdkVersion>,
}

impl SdkEntry {
    /// Whether `version` is a listed major version.
    pub fn has_version(&self, version: u32) -> bool {
        self.sdk.contains_key(&version)
    }
}

/// Display names and links for one major SDK version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkVersion {
    /// Entity for the full name.
    pub long: String,
    /// Entity for the short name.
    pub short: String,
    /// Developer guide link.
    pub guide: Option<String>,
    /// API reference for this version.
    pub api_ref: Option<ApiRef>,
}

/// API reference location for an SDK version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiRef {
    /// Identifier of the reference set.
    pub uid: String,
    /// Display name of the reference.
    pub name: String,
    /// Template for links into the reference.
    pub link_template: Option<String>,
}

/// One entry of `services.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEntry {
    /// Entity for the full service name.
    pub long: String,
    /// Entity for the short service name.
    pub short: String,
    /// Key the service sorts by in listings.
    pub sort: Option<String>,
    /// API version identifier, e.g. `sqs-2012-11-05`.
    pub version: Option<String>,
    /// Spelled-out names.
    pub expanded: Option<ExpandedName>,
    /// Sentence fragment describing the service.
    pub blurb: Option<String>,
    /// User guide link.
    pub guide: Option<ServiceGuide>,
    /// API reference path.
    pub api_ref: Option<String>,
}

/// Spelled-out service names, for renderers that cannot use entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandedName {
    /// Full spelled-out name.
    pub long: String,
    /// Short spelled-out name.
    pub short: String,
}

/// Link to a service's user guide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceGuide {
    /// Guide title shown after the service name.
    pub subtitle: Option<String>,
    /// Path relative to the documentation host.
    pub url: String,
}

/// Parse every top-level entry of a document, failing on the first entry
/// that does not fit `T`.
pub fn parse_entries<T: DeserializeOwned>(
    document: &Value,
) -> Result<BTreeMap<String, T>, ModelError> {
    parse_each(document)?
        .into_iter()
        .map(|(key, entry)| entry.map(|parsed| (key, parsed)))
        .collect()
}

/// Parse every top-level entry of a document independently.
///
/// Only a non-mapping root is an error; each entry carries its own result.
/// Entries are returned in key order.
pub fn parse_each<T: DeserializeOwned>(
    document: &Value,
) -> Result<Vec<(String, Result<T, ModelError>)>, ModelError> {
    let Value::Object(map) = document else {
        return Err(ModelError::NotAMapping {
            found: json_type_name(document),
        });
    };

    let mut entries: Vec<(String, Result<T, ModelError>)> = map
        .iter()
        .map(|(key, value)| {
            let parsed = serde_json::from_value::<T>(value.clone()).map_err(|source| {
                ModelError::Entry {
                    key: key.clone(),
                    source,
                }
            });
            (key.clone(), parsed)
        })
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

/// Escape a key for use as a JSON Pointer segment (RFC 6901).
pub fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Reverse of [`escape_pointer`].
pub fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}
