//! Document tools: `find_many`, `find_one`, `create`, `update`, `delete`
//!
//! Each handler checks the content type against the catalog before any
//! store call. Query parameters and write payloads are sanitized on the way
//! in, store results on the way out; a sanitization failure aborts the call.

use crate::mcp::handlers::tools::ToolServices;
use crate::mcp::schemas::{CreateArgs, DeleteArgs, FindManyArgs, FindOneArgs, UpdateArgs};
use crate::models::{AuthContext, FindOneParams, FindParams, QueryParams, WriteOptions};
use crate::services::GatewayError;
use crate::utils::{project, ProjectionPolicy, CONTENT_OMITTED_NOTE};
use serde_json::{json, Value};

pub async fn find_many(
    services: &ToolServices,
    args: FindManyArgs,
    auth: Option<&AuthContext>,
) -> Result<Value, GatewayError> {
    let uid = args.uid;
    services.content_types.ensure_valid(&uid)?;

    let policy = ProjectionPolicy::new(args.include_content, args.fields.is_some());

    let query = services.sanitizer.sanitize_query(
        &uid,
        QueryParams {
            filters: args.filters,
            populate: args.populate,
            fields: args.fields,
            sort: args.sort,
        },
        auth,
    )?;

    let results = services
        .documents
        .find_many(
            &uid,
            FindParams {
                query,
                pagination: args.pagination,
                status: args.status,
                locale: args.locale,
            },
        )
        .await?;

    let data = services
        .sanitizer
        .sanitize_output(&uid, Value::Array(results), auth)?;
    let data = project(data, policy);
    let count = data.as_array().map_or(0, Vec::len);

    let mut payload = json!({
        "data": data,
        "count": count,
        "uid": uid,
    });
    if policy.strips() {
        payload["note"] = Value::String(CONTENT_OMITTED_NOTE.to_string());
    }

    Ok(payload)
}

/// Absence is reported in a success-shaped payload, not as an error
pub async fn find_one(
    services: &ToolServices,
    args: FindOneArgs,
    auth: Option<&AuthContext>,
) -> Result<Value, GatewayError> {
    let FindOneArgs {
        uid,
        document_id,
        populate,
        fields,
        status,
        locale,
    } = args;
    services.content_types.ensure_valid(&uid)?;

    let query = services.sanitizer.sanitize_query(
        &uid,
        QueryParams {
            populate,
            fields,
            ..Default::default()
        },
        auth,
    )?;

    let params = FindOneParams {
        populate: query.populate,
        fields: query.fields,
        status,
        locale,
    };

    let Some(document) = services.documents.find_one(&uid, &document_id, params).await? else {
        return Ok(json!({
            "error": "Document not found",
            "uid": uid,
            "documentId": document_id,
        }));
    };

    let data = services.sanitizer.sanitize_output(&uid, document, auth)?;

    Ok(json!({
        "data": data,
        "uid": uid,
        "documentId": document_id,
    }))
}

pub async fn create(
    services: &ToolServices,
    args: CreateArgs,
    auth: Option<&AuthContext>,
) -> Result<Value, GatewayError> {
    let uid = args.uid;
    services.content_types.ensure_valid(&uid)?;

    let data = services
        .sanitizer
        .sanitize_input(&uid, Some(args.data), auth)?
        .unwrap_or_default();

    let created = services
        .documents
        .create(
            &uid,
            data,
            WriteOptions {
                locale: args.locale,
                status: args.status,
            },
        )
        .await?;

    let data = services.sanitizer.sanitize_output(&uid, created, auth)?;

    Ok(json!({
        "success": true,
        "data": data,
        "uid": uid,
        "message": "Document created successfully",
    }))
}

pub async fn update(
    services: &ToolServices,
    args: UpdateArgs,
    auth: Option<&AuthContext>,
) -> Result<Value, GatewayError> {
    let UpdateArgs {
        uid,
        document_id,
        data,
        locale,
        status,
    } = args;
    services.content_types.ensure_valid(&uid)?;

    let data = services
        .sanitizer
        .sanitize_input(&uid, Some(data), auth)?
        .unwrap_or_default();

    let updated = services
        .documents
        .update(&uid, &document_id, data, WriteOptions { locale, status })
        .await?;

    let data = services.sanitizer.sanitize_output(&uid, updated, auth)?;

    Ok(json!({
        "success": true,
        "data": data,
        "uid": uid,
        "documentId": document_id,
        "message": "Document updated successfully",
    }))
}

pub async fn delete(
    services: &ToolServices,
    args: DeleteArgs,
    auth: Option<&AuthContext>,
) -> Result<Value, GatewayError> {
    let DeleteArgs {
        uid,
        document_id,
        locale,
    } = args;
    services.content_types.ensure_valid(&uid)?;

    let result = services.documents.delete(&uid, &document_id, locale).await?;

    let entries = services
        .sanitizer
        .sanitize_output(&uid, Value::Array(result.entries), auth)?;

    Ok(json!({
        "success": true,
        "data": {
            "documentId": result.document_id,
            "entries": entries,
        },
        "uid": uid,
        "documentId": document_id,
        "message": "Document deleted successfully",
    }))
}
