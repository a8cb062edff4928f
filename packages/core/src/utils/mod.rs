//! Utility functions shared by the tool handlers

mod content_projection;

pub use content_projection::{
    is_large_field, project, strip_large_fields, ProjectionPolicy, CONTENT_OMITTED_NOTE,
    LARGE_CONTENT_FIELDS,
};
