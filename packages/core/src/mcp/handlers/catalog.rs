//! Catalog tools: `list_content_types` and `list_components`

use crate::mcp::handlers::tools::ToolServices;
use crate::mcp::schemas::ListComponentsArgs;
use serde_json::{json, Value};

pub fn list_content_types(services: &ToolServices) -> Value {
    let content_types = services.content_types.list();

    json!({
        "contentTypes": content_types,
        "count": content_types.len(),
        "usage": {
            "tip": "Use the uid field when calling find_many, find_one, create, update, or delete tools",
            "example": "find_many with uid: 'api::article.article'"
        }
    })
}

/// One page of components plus the category index
///
/// A page past the end yields empty `data` with the real `pageCount`.
pub fn list_components(services: &ToolServices, args: ListComponentsArgs) -> Value {
    let page = services
        .components
        .list(args.page, args.page_size, args.category.as_deref());

    let mut payload = json!({
        "data": page.data,
        "pagination": page.pagination,
        "categories": services.components.categories(),
    });

    if let Some(category) = args.category {
        payload["category"] = Value::String(category);
    }

    payload
}
