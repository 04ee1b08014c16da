mod condition;
mod parser;
mod schema;

pub use condition::{ModelCondition, is_truthy};
pub use parser::{FieldEntry, parse_field_document, parse_form_document};
pub use schema::{FieldSchema, ModelPredicate, SchemaExtension, SchemaPatch, WidgetType};
