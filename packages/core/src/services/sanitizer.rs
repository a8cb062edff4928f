//! Sanitization Boundary
//!
//! Schema-directed filtering of everything that crosses the gateway:
//!
//! - `sanitize_output` removes private, password and unreadable fields from
//!   store results, recursing into populated relations, components and
//!   dynamic zones
//! - `sanitize_input` removes system-managed, unknown and unwritable fields
//!   from write payloads
//! - `sanitize_query` constrains filters, population, field selection and
//!   sort keys to fields the caller may read
//!
//! All three are fail-closed. When a pass cannot complete the caller gets a
//! [`SanitizeError`] and must abort; a partially sanitized payload is never
//! returned. Absent payloads pass through untouched without a schema lookup.

use crate::db::SchemaRegistry;
use crate::logging::McpLogger;
use crate::models::{AttributeDefinition, Attributes, AuthContext, Populate, QueryParams, SortSpec};
use crate::services::error::{SanitizeError, SanitizeStage};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Fields managed by the store that are always readable
const SYSTEM_READ_FIELDS: &[&str] = &[
    "id",
    "documentId",
    "locale",
    "createdAt",
    "updatedAt",
    "publishedAt",
];

/// Fields callers may never write directly
const SYSTEM_WRITE_FIELDS: &[&str] = &[
    "id",
    "documentId",
    "locale",
    "createdAt",
    "updatedAt",
    "publishedAt",
    "createdBy",
    "updatedBy",
    "localizations",
];

/// Discriminator key of dynamic zone entries
const COMPONENT_KEY: &str = "__component";

/// Nesting beyond this depth is treated as a sanitization failure
pub const MAX_SANITIZE_DEPTH: usize = 32;

type PassResult<T> = Result<T, String>;

/// Fail-closed sanitizer over the schema catalog
#[derive(Clone)]
pub struct Sanitizer {
    registry: Arc<dyn SchemaRegistry>,
    logger: McpLogger,
}

impl Sanitizer {
    pub fn new(registry: Arc<dyn SchemaRegistry>, logger: McpLogger) -> Self {
        Self { registry, logger }
    }

    /// Filter a store result down to fields the caller may read
    pub fn sanitize_output(
        &self,
        uid: &str,
        data: Value,
        auth: Option<&AuthContext>,
    ) -> Result<Value, SanitizeError> {
        if data.is_null() {
            return Ok(data);
        }

        let attributes = self.attributes(uid, SanitizeStage::Output)?;
        let pass = Pass::new(self.registry.as_ref(), auth);
        let result = match data {
            Value::Array(items) => items
                .into_iter()
                .map(|item| pass.output_record(uid, attributes, item, 0))
                .collect::<PassResult<Vec<_>>>()
                .map(Value::Array),
            other => pass.output_record(uid, attributes, other, 0),
        };

        self.finish(uid, SanitizeStage::Output, result)
    }

    /// Filter a write payload down to fields the caller may write
    pub fn sanitize_input(
        &self,
        uid: &str,
        data: Option<Map<String, Value>>,
        auth: Option<&AuthContext>,
    ) -> Result<Option<Map<String, Value>>, SanitizeError> {
        let Some(data) = data else {
            return Ok(None);
        };

        let attributes = self.attributes(uid, SanitizeStage::Input)?;
        let pass = Pass::new(self.registry.as_ref(), auth);
        let result = pass.input_object(uid, attributes, data, 0, false);

        self.finish(uid, SanitizeStage::Input, result).map(Some)
    }

    /// Constrain query parameters to readable fields
    pub fn sanitize_query(
        &self,
        uid: &str,
        query: QueryParams,
        auth: Option<&AuthContext>,
    ) -> Result<QueryParams, SanitizeError> {
        if query.is_empty() {
            return Ok(query);
        }

        let attributes = self.attributes(uid, SanitizeStage::Query)?;
        let pass = Pass::new(self.registry.as_ref(), auth);
        let result = pass.query(uid, attributes, query, 0);

        self.finish(uid, SanitizeStage::Query, result)
    }

    fn attributes(&self, uid: &str, stage: SanitizeStage) -> Result<&Attributes, SanitizeError> {
        self.registry
            .content_type(uid)
            .map(|schema| &schema.attributes)
            .ok_or_else(|| SanitizeError::unknown_content_type(uid, stage))
    }

    fn finish<T>(
        &self,
        uid: &str,
        stage: SanitizeStage,
        result: PassResult<T>,
    ) -> Result<T, SanitizeError> {
        result.map_err(|reason| {
            let message = match stage {
                SanitizeStage::Output => "Output sanitization failed",
                SanitizeStage::Input => "Input sanitization failed",
                SanitizeStage::Query => "Query sanitization failed",
            };
            self.logger
                .error(message, Some(json!({ "uid": uid, "error": reason })));
            SanitizeError::failed(uid, stage, reason)
        })
    }
}

/// One sanitization pass bound to a permission context
struct Pass<'a> {
    registry: &'a dyn SchemaRegistry,
    auth: Option<&'a AuthContext>,
}

impl<'a> Pass<'a> {
    fn new(registry: &'a dyn SchemaRegistry, auth: Option<&'a AuthContext>) -> Self {
        Self { registry, auth }
    }

    fn readable(&self, uid: &str, field: &str) -> bool {
        self.auth.map_or(true, |auth| auth.can_read(uid, field))
    }

    fn writable(&self, uid: &str, field: &str) -> bool {
        self.auth.map_or(true, |auth| auth.can_write(uid, field))
    }

    /// Attribute lookup for a field the caller may see at all
    fn visible<'s>(
        &self,
        uid: &str,
        attributes: &'s Attributes,
        field: &str,
    ) -> Option<&'s AttributeDefinition> {
        attributes
            .get(field)
            .filter(|attribute| !attribute.is_hidden() && self.readable(uid, field))
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    fn output_record(
        &self,
        uid: &str,
        attributes: &Attributes,
        value: Value,
        depth: usize,
    ) -> PassResult<Value> {
        check_depth(depth)?;
        match value {
            Value::Object(map) => self.output_object(uid, attributes, map, depth).map(Value::Object),
            Value::Null => Ok(Value::Null),
            other => Err(format!("expected a record object, found {}", type_name(&other))),
        }
    }

    fn output_object(
        &self,
        uid: &str,
        attributes: &Attributes,
        map: Map<String, Value>,
        depth: usize,
    ) -> PassResult<Map<String, Value>> {
        let mut sanitized = Map::new();

        for (key, value) in map {
            if SYSTEM_READ_FIELDS.contains(&key.as_str()) {
                sanitized.insert(key, value);
                continue;
            }

            let Some(attribute) = self.visible(uid, attributes, &key) else {
                continue;
            };

            let value = if value.is_null() {
                value
            } else if attribute.is_relation() {
                let target = attribute
                    .target
                    .as_deref()
                    .and_then(|target| self.registry.content_type(target));
                match target {
                    Some(target) => {
                        self.output_relation(&target.uid, &target.attributes, value, depth + 1)?
                    }
                    None => continue,
                }
            } else if attribute.is_component() {
                let component = attribute
                    .component
                    .as_deref()
                    .and_then(|component| self.registry.component(component));
                match component {
                    Some(component) => self.output_component(
                        &component.uid,
                        &component.attributes,
                        value,
                        depth + 1,
                    )?,
                    None => continue,
                }
            } else if attribute.is_dynamic_zone() {
                self.output_dynamic_zone(value, depth + 1)?
            } else {
                value
            };

            sanitized.insert(key, value);
        }

        Ok(sanitized)
    }

    /// Populated relations are sanitized; bare ids and counts pass through
    fn output_relation(
        &self,
        uid: &str,
        attributes: &Attributes,
        value: Value,
        depth: usize,
    ) -> PassResult<Value> {
        check_depth(depth)?;
        match value {
            Value::Object(map) if map.contains_key("count") && map.len() == 1 => {
                Ok(Value::Object(map))
            }
            Value::Object(map) => self.output_object(uid, attributes, map, depth).map(Value::Object),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => {
                        self.output_object(uid, attributes, map, depth + 1).map(Value::Object)
                    }
                    scalar => Ok(scalar),
                })
                .collect::<PassResult<Vec<_>>>()
                .map(Value::Array),
            scalar => Ok(scalar),
        }
    }

    fn output_component(
        &self,
        uid: &str,
        attributes: &Attributes,
        value: Value,
        depth: usize,
    ) -> PassResult<Value> {
        check_depth(depth)?;
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.output_record(uid, attributes, item, depth + 1))
                .collect::<PassResult<Vec<_>>>()
                .map(Value::Array),
            other => self.output_record(uid, attributes, other, depth),
        }
    }

    fn output_dynamic_zone(&self, value: Value, depth: usize) -> PassResult<Value> {
        check_depth(depth)?;
        let Value::Array(entries) = value else {
            return Err(format!(
                "dynamic zone must be an array, found {}",
                type_name(&value)
            ));
        };

        let mut sanitized = Vec::with_capacity(entries.len());
        for entry in entries {
            let Value::Object(map) = entry else {
                return Err("dynamic zone entries must be objects".to_string());
            };
            let Some(component_uid) = map.get(COMPONENT_KEY).and_then(Value::as_str) else {
                continue;
            };
            let Some(component) = self.registry.component(component_uid) else {
                continue;
            };

            let component_uid = component_uid.to_string();
            let mut object =
                self.output_object(&component.uid, &component.attributes, map, depth + 1)?;
            object.insert(COMPONENT_KEY.to_string(), Value::String(component_uid));
            sanitized.push(Value::Object(object));
        }

        Ok(Value::Array(sanitized))
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    fn input_object(
        &self,
        uid: &str,
        attributes: &Attributes,
        map: Map<String, Value>,
        depth: usize,
        nested: bool,
    ) -> PassResult<Map<String, Value>> {
        check_depth(depth)?;
        let mut sanitized = Map::new();

        for (key, value) in map {
            // Existing component entries are addressed by id
            if nested && key == "id" {
                sanitized.insert(key, value);
                continue;
            }
            if SYSTEM_WRITE_FIELDS.contains(&key.as_str()) {
                continue;
            }

            let Some(attribute) = attributes.get(&key) else {
                continue;
            };
            if !self.writable(uid, &key) {
                continue;
            }

            let value = if value.is_null() {
                value
            } else if attribute.is_component() {
                let component = attribute
                    .component
                    .as_deref()
                    .and_then(|component| self.registry.component(component));
                match component {
                    Some(component) => self.input_component(
                        &component.uid,
                        &component.attributes,
                        value,
                        depth + 1,
                    )?,
                    None => continue,
                }
            } else if attribute.is_dynamic_zone() {
                self.input_dynamic_zone(&attribute.components, value, depth + 1)?
            } else {
                value
            };

            sanitized.insert(key, value);
        }

        Ok(sanitized)
    }

    fn input_component(
        &self,
        uid: &str,
        attributes: &Attributes,
        value: Value,
        depth: usize,
    ) -> PassResult<Value> {
        match value {
            Value::Object(map) => self
                .input_object(uid, attributes, map, depth, true)
                .map(Value::Object),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => self
                        .input_object(uid, attributes, map, depth + 1, true)
                        .map(Value::Object),
                    other => Err(format!(
                        "component entries must be objects, found {}",
                        type_name(&other)
                    )),
                })
                .collect::<PassResult<Vec<_>>>()
                .map(Value::Array),
            other => Err(format!(
                "component value must be an object, found {}",
                type_name(&other)
            )),
        }
    }

    fn input_dynamic_zone(
        &self,
        allowed: &[String],
        value: Value,
        depth: usize,
    ) -> PassResult<Value> {
        let Value::Array(entries) = value else {
            return Err(format!(
                "dynamic zone must be an array, found {}",
                type_name(&value)
            ));
        };

        let mut sanitized = Vec::with_capacity(entries.len());
        for entry in entries {
            let Value::Object(map) = entry else {
                return Err("dynamic zone entries must be objects".to_string());
            };
            let Some(component_uid) = map.get(COMPONENT_KEY).and_then(Value::as_str) else {
                continue;
            };
            if !allowed.is_empty() && !allowed.iter().any(|uid| uid == component_uid) {
                continue;
            }
            let Some(component) = self.registry.component(component_uid) else {
                continue;
            };

            let component_uid = component_uid.to_string();
            let mut object =
                self.input_object(&component.uid, &component.attributes, map, depth + 1, true)?;
            object.insert(COMPONENT_KEY.to_string(), Value::String(component_uid));
            sanitized.push(Value::Object(object));
        }

        Ok(Value::Array(sanitized))
    }

    // ------------------------------------------------------------------
    // Query
    // ------------------------------------------------------------------

    fn query(
        &self,
        uid: &str,
        attributes: &Attributes,
        query: QueryParams,
        depth: usize,
    ) -> PassResult<QueryParams> {
        check_depth(depth)?;

        let filters = query
            .filters
            .map(|filters| self.filters(uid, attributes, filters, depth + 1))
            .transpose()?;
        let populate = query
            .populate
            .map(|populate| self.populate(uid, attributes, populate, depth + 1))
            .transpose()?
            .flatten();
        let fields = query.fields.map(|fields| self.fields(uid, attributes, fields));
        let sort = query
            .sort
            .and_then(|sort| self.sort(uid, attributes, &sort));

        Ok(QueryParams {
            filters,
            populate,
            fields,
            sort,
        })
    }

    fn filters(
        &self,
        uid: &str,
        attributes: &Attributes,
        filters: Map<String, Value>,
        depth: usize,
    ) -> PassResult<Map<String, Value>> {
        check_depth(depth)?;
        let mut sanitized = Map::new();

        for (key, value) in filters {
            match key.as_str() {
                "$and" | "$or" => {
                    let Value::Array(clauses) = value else {
                        return Err(format!("{} expects an array of filter objects", key));
                    };
                    let clauses = clauses
                        .into_iter()
                        .map(|clause| match clause {
                            Value::Object(clause) => self
                                .filters(uid, attributes, clause, depth + 1)
                                .map(Value::Object),
                            other => Err(format!(
                                "{} clauses must be objects, found {}",
                                key,
                                type_name(&other)
                            )),
                        })
                        .collect::<PassResult<Vec<_>>>()?;
                    sanitized.insert(key, Value::Array(clauses));
                }
                "$not" => {
                    let Value::Object(clause) = value else {
                        return Err("$not expects a filter object".to_string());
                    };
                    let clause = self.filters(uid, attributes, clause, depth + 1)?;
                    sanitized.insert(key, Value::Object(clause));
                }
                operator if operator.starts_with('$') => {}
                field if SYSTEM_READ_FIELDS.contains(&field) => {
                    sanitized.insert(key, operators_only(value));
                }
                field => {
                    let Some(attribute) = self.visible(uid, attributes, field) else {
                        continue;
                    };

                    let nested_schema = if attribute.is_relation() {
                        attribute
                            .target
                            .as_deref()
                            .and_then(|target| self.registry.content_type(target))
                            .map(|schema| (schema.uid.as_str(), &schema.attributes))
                    } else if attribute.is_component() {
                        attribute
                            .component
                            .as_deref()
                            .and_then(|component| self.registry.component(component))
                            .map(|schema| (schema.uid.as_str(), &schema.attributes))
                    } else if attribute.is_populatable() {
                        continue;
                    } else {
                        sanitized.insert(key, operators_only(value));
                        continue;
                    };

                    let Some((nested_uid, nested_attributes)) = nested_schema else {
                        continue;
                    };
                    // Comparison operators apply to the field itself; other keys address the target
                    let value = match value {
                        Value::Object(map) => {
                            let (operators, nested): (Map<String, Value>, Map<String, Value>) =
                                map.into_iter()
                                    .partition(|(key, _)| is_comparison_operator(key));
                            let mut condition =
                                self.filters(nested_uid, nested_attributes, nested, depth + 1)?;
                            condition.extend(operators);
                            Value::Object(condition)
                        }
                        scalar => scalar,
                    };
                    sanitized.insert(key, value);
                }
            }
        }

        Ok(sanitized)
    }

    fn fields(&self, uid: &str, attributes: &Attributes, fields: Vec<String>) -> Vec<String> {
        fields
            .into_iter()
            .filter(|field| {
                SYSTEM_READ_FIELDS.contains(&field.as_str())
                    || self
                        .visible(uid, attributes, field)
                        .is_some_and(|attribute| !attribute.is_populatable())
            })
            .collect()
    }

    fn sort(&self, uid: &str, attributes: &Attributes, sort: &SortSpec) -> Option<SortSpec> {
        let entries: Vec<String> = sort
            .entries()
            .into_iter()
            .filter(|entry| {
                let (field, direction) = entry.split_once(':').unwrap_or((*entry, "asc"));
                let direction_ok = direction.eq_ignore_ascii_case("asc")
                    || direction.eq_ignore_ascii_case("desc");
                let field_ok = SYSTEM_READ_FIELDS.contains(&field)
                    || self
                        .visible(uid, attributes, field)
                        .is_some_and(|attribute| !attribute.is_populatable());
                direction_ok && field_ok
            })
            .map(str::to_string)
            .collect();

        match (sort, entries.len()) {
            (_, 0) => None,
            (SortSpec::Single(_), 1) => entries.into_iter().next().map(SortSpec::Single),
            _ => Some(SortSpec::List(entries)),
        }
    }

    fn populate(
        &self,
        uid: &str,
        attributes: &Attributes,
        populate: Populate,
        depth: usize,
    ) -> PassResult<Option<Populate>> {
        check_depth(depth)?;
        let populatable = |field: &str| {
            self.visible(uid, attributes, field)
                .is_some_and(|attribute| attribute.is_populatable())
        };

        Ok(match populate {
            Populate::Single(value) if value == "*" => Some(Populate::Single(value)),
            Populate::Single(value) => {
                let kept: Vec<&str> = value
                    .split(',')
                    .map(str::trim)
                    .filter(|field| populatable(*field))
                    .collect();
                (!kept.is_empty()).then(|| Populate::Single(kept.join(",")))
            }
            Populate::List(values) => {
                let kept: Vec<String> = values
                    .into_iter()
                    .filter(|field| field == "*" || populatable(field))
                    .collect();
                (!kept.is_empty()).then_some(Populate::List(kept))
            }
            Populate::Nested(map) => {
                let mut kept = Map::new();
                for (field, options) in map {
                    if !populatable(&field) {
                        continue;
                    }
                    let Some(attribute) = attributes.get(&field) else {
                        continue;
                    };
                    let options = match options {
                        Value::Object(options) => {
                            match self.nested_populate(attribute, options, depth + 1)? {
                                Some(options) => Value::Object(options),
                                None => continue,
                            }
                        }
                        other => other,
                    };
                    kept.insert(field, options);
                }
                (!kept.is_empty()).then_some(Populate::Nested(kept))
            }
        })
    }

    /// Sanitize `{fields, filters, populate, sort, on}` options of one populated attribute
    fn nested_populate(
        &self,
        attribute: &AttributeDefinition,
        options: Map<String, Value>,
        depth: usize,
    ) -> PassResult<Option<Map<String, Value>>> {
        check_depth(depth)?;

        if attribute.is_dynamic_zone() {
            let mut sanitized = Map::new();
            if let Some(Value::Object(entries)) = options.get("on") {
                let mut on = Map::new();
                for (component_uid, component_options) in entries {
                    let Some(component) = self.registry.component(component_uid) else {
                        continue;
                    };
                    let options = match component_options {
                        Value::Object(map) => Value::Object(self.nested_options(
                            &component.uid,
                            &component.attributes,
                            map.clone(),
                            depth + 1,
                        )?),
                        other => other.clone(),
                    };
                    on.insert(component_uid.clone(), options);
                }
                sanitized.insert("on".to_string(), Value::Object(on));
            }
            // A wildcard populates every component of the zone with its own sanitized output
            match options.get("populate") {
                Some(Value::String(wildcard)) if wildcard == "*" => {
                    sanitized.insert("populate".to_string(), json!("*"));
                }
                Some(Value::Bool(true)) => {
                    sanitized.insert("populate".to_string(), json!(true));
                }
                _ => {}
            }
            return Ok(Some(sanitized));
        }

        let target = if attribute.is_relation() {
            attribute
                .target
                .as_deref()
                .and_then(|target| self.registry.content_type(target))
                .map(|schema| (schema.uid.as_str(), &schema.attributes))
        } else if attribute.is_component() {
            attribute
                .component
                .as_deref()
                .and_then(|component| self.registry.component(component))
                .map(|schema| (schema.uid.as_str(), &schema.attributes))
        } else {
            // Media options are not schema-checked; only population itself is allowed
            return Ok(Some(Map::new()));
        };

        match target {
            Some((target_uid, target_attributes)) => self
                .nested_options(target_uid, target_attributes, options, depth + 1)
                .map(Some),
            None => Ok(None),
        }
    }

    fn nested_options(
        &self,
        uid: &str,
        attributes: &Attributes,
        options: Map<String, Value>,
        depth: usize,
    ) -> PassResult<Map<String, Value>> {
        let query = QueryParams {
            filters: match options.get("filters") {
                Some(Value::Object(filters)) => Some(filters.clone()),
                _ => None,
            },
            populate: options
                .get("populate")
                .cloned()
                .and_then(|value| serde_json::from_value(value).ok()),
            fields: options
                .get("fields")
                .cloned()
                .and_then(|value| serde_json::from_value(value).ok()),
            sort: options
                .get("sort")
                .cloned()
                .and_then(|value| serde_json::from_value(value).ok()),
        };

        let query = self.query(uid, attributes, query, depth)?;
        let mut sanitized = Map::new();
        if let Some(filters) = query.filters {
            sanitized.insert("filters".to_string(), Value::Object(filters));
        }
        if let Some(populate) = query.populate {
            sanitized.insert("populate".to_string(), json!(populate));
        }
        if let Some(fields) = query.fields {
            sanitized.insert("fields".to_string(), json!(fields));
        }
        if let Some(sort) = query.sort {
            sanitized.insert("sort".to_string(), json!(sort));
        }
        Ok(sanitized)
    }
}

fn check_depth(depth: usize) -> PassResult<()> {
    if depth > MAX_SANITIZE_DEPTH {
        Err(format!(
            "payload nesting exceeds {} levels",
            MAX_SANITIZE_DEPTH
        ))
    } else {
        Ok(())
    }
}

/// `$eq`, `$null`, `$in` and friends, as opposed to the logical `$and`/`$or`/`$not`
fn is_comparison_operator(key: &str) -> bool {
    key.starts_with('$') && !matches!(key, "$and" | "$or" | "$not")
}

/// Keep only `$operator` keys of a filter condition; scalars are equality checks
fn operators_only(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| key.starts_with('$'))
                .collect(),
        ),
        other => other,
    }
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

#[cfg(test)]
#[path = "sanitizer_test.rs"]
mod sanitizer_test;
