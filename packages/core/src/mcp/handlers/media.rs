//! Media tool: `upload_media`

use crate::mcp::handlers::tools::ToolServices;
use crate::mcp::schemas::UploadMediaArgs;
use crate::services::{GatewayError, MediaMetadata};
use serde_json::{json, Value};

/// Fetch a URL into the media library
///
/// The returned record is a media library file, not a content-type
/// document, so it is returned as the upload capability produced it.
pub async fn upload_media(
    services: &ToolServices,
    args: UploadMediaArgs,
) -> Result<Value, GatewayError> {
    let metadata = MediaMetadata {
        name: args.name,
        caption: args.caption,
        alternative_text: args.alternative_text,
    };

    let file = services
        .media
        .upload_from_url(&args.url, metadata)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::upstream("Upload returned no files"))?;

    let example = format!("update with data: {{ image: {} }}", file["id"]);

    Ok(json!({
        "success": true,
        "data": file,
        "message": "File uploaded successfully",
        "usage": {
            "tip": "Use the id or documentId to link this media to a content entry",
            "example": example,
        }
    }))
}
