//! Tool Input Schemas
//!
//! Every tool is a variant of the closed [`ToolName`] enum. Each variant owns
//! a declarative field table ([`FieldSpec`]) that serves two purposes:
//!
//! - validating untyped `tools/call` arguments, collecting every violated
//!   constraint instead of stopping at the first one
//! - rendering the JSON Schema advertised through `tools/list`
//!
//! Validation normalizes the arguments (unknown keys dropped, defaults
//! applied) before serde turns them into the typed record carried by
//! [`ValidatedArguments`]. Handlers only ever see the typed record.

use crate::models::{DocumentStatus, PaginationArgs, Populate, SortSpec};
use crate::services::{FieldIssue, GatewayError};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fmt;

/// Closed set of callable tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListContentTypes,
    ListComponents,
    FindMany,
    FindOne,
    Create,
    Update,
    Delete,
    UploadMedia,
}

impl ToolName {
    /// Registry order as advertised by `tools/list`
    pub const ALL: [ToolName; 8] = [
        ToolName::ListContentTypes,
        ToolName::ListComponents,
        ToolName::FindMany,
        ToolName::FindOne,
        ToolName::Create,
        ToolName::Update,
        ToolName::Delete,
        ToolName::UploadMedia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ListContentTypes => "list_content_types",
            ToolName::ListComponents => "list_components",
            ToolName::FindMany => "find_many",
            ToolName::FindOne => "find_one",
            ToolName::Create => "create",
            ToolName::Update => "update",
            ToolName::Delete => "delete",
            ToolName::UploadMedia => "upload_media",
        }
    }

    /// Resolve a wire name; `None` for anything outside the registry
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::ListContentTypes => "List all available content types in the CMS with their schemas, including field definitions and relationships.",
            ToolName::ListComponents => "List all components in the CMS with pagination support. Components are reusable field groups that can be used across content types.",
            ToolName::FindMany => "Query multiple documents from a content type. Supports filtering, sorting, pagination, field selection, and population of relations. Large content fields are omitted unless includeContent is true or fields are specified.",
            ToolName::FindOne => "Get a single document by its documentId. Supports field selection and population of relations.",
            ToolName::Create => "Create a new document in a content type. This is a write operation.",
            ToolName::Update => "Update an existing document by its documentId. This is a write operation.",
            ToolName::Delete => "Delete a document by its documentId. This is a destructive write operation.",
            ToolName::UploadMedia => "Upload a media file from a URL to the media library. This is a write operation.",
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            ToolName::ListContentTypes => &[],
            ToolName::ListComponents => LIST_COMPONENTS_FIELDS,
            ToolName::FindMany => FIND_MANY_FIELDS,
            ToolName::FindOne => FIND_ONE_FIELDS,
            ToolName::Create => CREATE_FIELDS,
            ToolName::Update => UPDATE_FIELDS,
            ToolName::Delete => DELETE_FIELDS,
            ToolName::UploadMedia => UPLOAD_MEDIA_FIELDS,
        }
    }

    /// JSON Schema for `tools/list`
    pub fn input_schema(&self) -> Value {
        object_schema(self.fields())
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint on one argument
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// String with a minimum length and the message reported below it
    String {
        min_len: usize,
        message: &'static str,
    },
    /// Absolute URL
    Url,
    Integer {
        min: i64,
        max: Option<i64>,
        default: Option<i64>,
    },
    Boolean,
    /// One of a fixed set of strings
    Enum(&'static [&'static str]),
    /// Free-form mapping
    Record,
    StringList,
    /// A string or a list of strings
    StringOrList,
    /// A string, a list of strings, or a mapping
    Populate,
    Object(&'static [FieldSpec]),
}

/// One declared argument of a tool
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

impl FieldSpec {
    const fn optional(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }

    const fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }
}

const PLAIN_STRING: FieldKind = FieldKind::String {
    min_len: 0,
    message: "",
};

const UID: FieldSpec = FieldSpec::required(
    "uid",
    FieldKind::String {
        min_len: 1,
        message: "Content type UID is required",
    },
    "Content type UID (e.g., 'api::article.article')",
);

const DOCUMENT_ID: FieldSpec = FieldSpec::required(
    "documentId",
    FieldKind::String {
        min_len: 1,
        message: "Document ID is required",
    },
    "The document ID",
);

const LOCALE: FieldSpec = FieldSpec::optional("locale", PLAIN_STRING, "Locale for i18n content");

const STATUS: FieldSpec = FieldSpec::optional(
    "status",
    FieldKind::Enum(DocumentStatus::VALUES),
    "Document status (draft or published)",
);

const POPULATE: FieldSpec = FieldSpec::optional(
    "populate",
    FieldKind::Populate,
    "Relations to populate (e.g., \"*\" for all, [\"author\", \"category\"], or { author: { fields: [\"name\"] } })",
);

const FIELDS: FieldSpec = FieldSpec::optional(
    "fields",
    FieldKind::StringList,
    "Fields to select (e.g., [\"title\", \"slug\"])",
);

const DATA: FieldSpec = FieldSpec::required("data", FieldKind::Record, "Document data to write");

const PAGINATION_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional(
        "page",
        FieldKind::Integer {
            min: 1,
            max: None,
            default: None,
        },
        "Page number (starts at 1)",
    ),
    FieldSpec::optional(
        "pageSize",
        FieldKind::Integer {
            min: 1,
            max: Some(100),
            default: None,
        },
        "Items per page",
    ),
    FieldSpec::optional(
        "start",
        FieldKind::Integer {
            min: 0,
            max: None,
            default: None,
        },
        "Offset (alternative to page)",
    ),
    FieldSpec::optional(
        "limit",
        FieldKind::Integer {
            min: 1,
            max: Some(100),
            default: None,
        },
        "Max items (alternative to pageSize)",
    ),
];

const LIST_COMPONENTS_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional(
        "page",
        FieldKind::Integer {
            min: 1,
            max: None,
            default: Some(1),
        },
        "Page number (starts at 1)",
    ),
    FieldSpec::optional(
        "pageSize",
        FieldKind::Integer {
            min: 1,
            max: Some(100),
            default: Some(25),
        },
        "Number of items per page (max 100)",
    ),
    FieldSpec::optional("category", PLAIN_STRING, "Filter by component category"),
];

const FIND_MANY_FIELDS: &[FieldSpec] = &[
    UID,
    FieldSpec::optional(
        "filters",
        FieldKind::Record,
        "Filter conditions (e.g., { title: { $contains: \"hello\" } })",
    ),
    POPULATE,
    FIELDS,
    FieldSpec::optional(
        "sort",
        FieldKind::StringOrList,
        "Sort order (e.g., \"createdAt:desc\" or [\"title:asc\", \"createdAt:desc\"])",
    ),
    FieldSpec::optional(
        "pagination",
        FieldKind::Object(PAGINATION_FIELDS),
        "Pagination options, either page/pageSize or start/limit",
    ),
    STATUS,
    LOCALE,
    FieldSpec::optional(
        "includeContent",
        FieldKind::Boolean,
        "Include large content fields (content, body, blocks, richText, html, markdown). Defaults to false.",
    ),
];

const FIND_ONE_FIELDS: &[FieldSpec] = &[UID, DOCUMENT_ID, POPULATE, FIELDS, STATUS, LOCALE];

const CREATE_FIELDS: &[FieldSpec] = &[UID, DATA, LOCALE, STATUS];

const UPDATE_FIELDS: &[FieldSpec] = &[UID, DOCUMENT_ID, DATA, LOCALE, STATUS];

const DELETE_FIELDS: &[FieldSpec] = &[UID, DOCUMENT_ID, LOCALE];

const UPLOAD_MEDIA_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("url", FieldKind::Url, "URL of the file to upload"),
    FieldSpec::optional("name", PLAIN_STRING, "File name (defaults to the URL's last path segment)"),
    FieldSpec::optional("caption", PLAIN_STRING, "Caption for the media"),
    FieldSpec::optional("alternativeText", PLAIN_STRING, "Alternative text for accessibility"),
];

// ============================================================================
// Typed arguments
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListComponentsArgs {
    pub page: u32,
    pub page_size: u32,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindManyArgs {
    pub uid: String,
    #[serde(default)]
    pub filters: Option<Map<String, Value>>,
    #[serde(default)]
    pub populate: Option<Populate>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub pagination: Option<PaginationArgs>,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub include_content: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindOneArgs {
    pub uid: String,
    pub document_id: String,
    #[serde(default)]
    pub populate: Option<Populate>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArgs {
    pub uid: String,
    pub data: Map<String, Value>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArgs {
    pub uid: String,
    pub document_id: String,
    pub data: Map<String, Value>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteArgs {
    pub uid: String,
    pub document_id: String,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMediaArgs {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub alternative_text: Option<String>,
}

/// Arguments that passed validation, one variant per tool
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedArguments {
    ListContentTypes,
    ListComponents(ListComponentsArgs),
    FindMany(FindManyArgs),
    FindOne(FindOneArgs),
    Create(CreateArgs),
    Update(UpdateArgs),
    Delete(DeleteArgs),
    UploadMedia(UploadMediaArgs),
}

impl ValidatedArguments {
    pub fn tool(&self) -> ToolName {
        match self {
            ValidatedArguments::ListContentTypes => ToolName::ListContentTypes,
            ValidatedArguments::ListComponents(_) => ToolName::ListComponents,
            ValidatedArguments::FindMany(_) => ToolName::FindMany,
            ValidatedArguments::FindOne(_) => ToolName::FindOne,
            ValidatedArguments::Create(_) => ToolName::Create,
            ValidatedArguments::Update(_) => ToolName::Update,
            ValidatedArguments::Delete(_) => ToolName::Delete,
            ValidatedArguments::UploadMedia(_) => ToolName::UploadMedia,
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Validate raw arguments for `tool`
///
/// A missing or `null` argument object is treated as `{}`. On failure the
/// error lists every violated constraint as `path: message`.
pub fn validate_tool_input(
    tool: ToolName,
    arguments: &Value,
) -> Result<ValidatedArguments, GatewayError> {
    let empty = Map::new();
    let input = match arguments {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(GatewayError::validation(
                tool.as_str(),
                vec![FieldIssue::new("", type_message("object", other))],
            ))
        }
    };

    let mut issues = Vec::new();
    let normalized = check_object(tool.fields(), input, "", &mut issues);
    if !issues.is_empty() {
        return Err(GatewayError::validation(tool.as_str(), issues));
    }

    let normalized = Value::Object(normalized);
    Ok(match tool {
        ToolName::ListContentTypes => ValidatedArguments::ListContentTypes,
        ToolName::ListComponents => ValidatedArguments::ListComponents(typed(tool, normalized)?),
        ToolName::FindMany => ValidatedArguments::FindMany(typed(tool, normalized)?),
        ToolName::FindOne => ValidatedArguments::FindOne(typed(tool, normalized)?),
        ToolName::Create => ValidatedArguments::Create(typed(tool, normalized)?),
        ToolName::Update => ValidatedArguments::Update(typed(tool, normalized)?),
        ToolName::Delete => ValidatedArguments::Delete(typed(tool, normalized)?),
        ToolName::UploadMedia => ValidatedArguments::UploadMedia(typed(tool, normalized)?),
    })
}

fn typed<T: DeserializeOwned>(tool: ToolName, value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| {
        GatewayError::validation(tool.as_str(), vec![FieldIssue::new("", e.to_string())])
    })
}

/// Check `input` against `fields`, returning only the declared keys with
/// defaults filled in
fn check_object(
    fields: &[FieldSpec],
    input: &Map<String, Value>,
    prefix: &str,
    issues: &mut Vec<FieldIssue>,
) -> Map<String, Value> {
    let mut output = Map::new();

    for field in fields {
        let path = join_path(prefix, field.name);

        match input.get(field.name) {
            None | Some(Value::Null) if !field.required => {
                if let FieldKind::Integer {
                    default: Some(default),
                    ..
                } = field.kind
                {
                    output.insert(field.name.to_string(), json!(default));
                }
            }
            None => issues.push(FieldIssue::new(path, "Required")),
            Some(value) => {
                if let Some(value) = check_value(&field.kind, value, &path, issues) {
                    output.insert(field.name.to_string(), value);
                }
            }
        }
    }

    output
}

fn check_value(
    kind: &FieldKind,
    value: &Value,
    path: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<Value> {
    match kind {
        FieldKind::String { min_len, message } => {
            let Some(text) = expect_str(value, path, issues) else {
                return None;
            };
            if text.chars().count() < *min_len {
                issues.push(FieldIssue::new(path, *message));
                return None;
            }
            Some(value.clone())
        }
        FieldKind::Url => {
            let text = expect_str(value, path, issues)?;
            if Url::parse(text).is_err() {
                issues.push(FieldIssue::new(path, "Must be a valid URL"));
                return None;
            }
            Some(value.clone())
        }
        FieldKind::Integer { min, max, .. } => {
            let Some(number) = value.as_f64() else {
                issues.push(FieldIssue::new(path, type_message("number", value)));
                return None;
            };
            if number.fract() != 0.0 {
                issues.push(FieldIssue::new(path, "Expected integer, received float"));
                return None;
            }
            let mut ok = true;
            if number < *min as f64 {
                issues.push(FieldIssue::new(
                    path,
                    format!("Number must be greater than or equal to {}", min),
                ));
                ok = false;
            }
            if let Some(max) = max {
                if number > *max as f64 {
                    issues.push(FieldIssue::new(
                        path,
                        format!("Number must be less than or equal to {}", max),
                    ));
                    ok = false;
                }
            }
            // Integer arguments are u32 once typed; larger requests saturate
            ok.then(|| json!((number as i64).min(i64::from(u32::MAX))))
        }
        FieldKind::Boolean => {
            if value.is_boolean() {
                Some(value.clone())
            } else {
                issues.push(FieldIssue::new(path, type_message("boolean", value)));
                None
            }
        }
        FieldKind::Enum(options) => {
            let text = expect_str(value, path, issues)?;
            if options.contains(&text) {
                Some(value.clone())
            } else {
                let expected = options
                    .iter()
                    .map(|option| format!("'{}'", option))
                    .collect::<Vec<_>>()
                    .join(" | ");
                issues.push(FieldIssue::new(
                    path,
                    format!("Invalid enum value. Expected {}, received '{}'", expected, text),
                ));
                None
            }
        }
        FieldKind::Record => {
            if value.is_object() {
                Some(value.clone())
            } else {
                issues.push(FieldIssue::new(path, type_message("object", value)));
                None
            }
        }
        FieldKind::StringList => {
            let Some(items) = value.as_array() else {
                issues.push(FieldIssue::new(path, type_message("array", value)));
                return None;
            };
            let before = issues.len();
            for (index, item) in items.iter().enumerate() {
                if !item.is_string() {
                    issues.push(FieldIssue::new(
                        join_path(path, &index.to_string()),
                        type_message("string", item),
                    ));
                }
            }
            (issues.len() == before).then(|| value.clone())
        }
        FieldKind::StringOrList => {
            if value.is_string() || is_string_list(value) {
                Some(value.clone())
            } else {
                issues.push(FieldIssue::new(path, "Invalid input"));
                None
            }
        }
        FieldKind::Populate => {
            if value.is_string() || value.is_object() || is_string_list(value) {
                Some(value.clone())
            } else {
                issues.push(FieldIssue::new(path, "Invalid input"));
                None
            }
        }
        FieldKind::Object(fields) => {
            let Some(map) = value.as_object() else {
                issues.push(FieldIssue::new(path, type_message("object", value)));
                return None;
            };
            let before = issues.len();
            let nested = check_object(fields, map, path, issues);
            (issues.len() == before).then(|| Value::Object(nested))
        }
    }
}

fn expect_str<'a>(value: &'a Value, path: &str, issues: &mut Vec<FieldIssue>) -> Option<&'a str> {
    let text = value.as_str();
    if text.is_none() {
        issues.push(FieldIssue::new(path, type_message("string", value)));
    }
    text
}

fn is_string_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(Value::is_string))
}

fn type_message(expected: &str, received: &Value) -> String {
    format!("Expected {}, received {}", expected, type_name(received))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

// ============================================================================
// Schema rendering
// ============================================================================

fn object_schema(fields: &[FieldSpec]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|field| (field.name.to_string(), property_schema(field)))
        .collect();
    let required: Vec<&str> = fields
        .iter()
        .filter(|field| field.required)
        .map(|field| field.name)
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn property_schema(field: &FieldSpec) -> Value {
    let mut schema = match field.kind {
        FieldKind::String { .. } => json!({ "type": "string" }),
        FieldKind::Url => json!({ "type": "string", "format": "uri" }),
        FieldKind::Integer { min, max, default } => {
            let mut schema = json!({ "type": "number", "minimum": min });
            if let Some(max) = max {
                schema["maximum"] = json!(max);
            }
            if let Some(default) = default {
                schema["default"] = json!(default);
            }
            schema
        }
        FieldKind::Boolean => json!({ "type": "boolean" }),
        FieldKind::Enum(options) => json!({ "type": "string", "enum": options }),
        FieldKind::Record => json!({ "type": "object" }),
        FieldKind::StringList => json!({ "type": "array", "items": { "type": "string" } }),
        FieldKind::StringOrList => json!({
            "oneOf": [
                { "type": "string" },
                { "type": "array", "items": { "type": "string" } }
            ]
        }),
        FieldKind::Populate => json!({
            "oneOf": [
                { "type": "string" },
                { "type": "array", "items": { "type": "string" } },
                { "type": "object" }
            ]
        }),
        FieldKind::Object(fields) => {
            let mut schema = object_schema(fields);
            if let Some(object) = schema.as_object_mut() {
                object.remove("required");
            }
            schema
        }
    };

    schema["description"] = json!(field.description);
    schema
}

#[cfg(test)]
#[path = "schemas_test.rs"]
mod schemas_test;
