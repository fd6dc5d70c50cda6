//! Record id generation
//!
//! Ids are UUID v7 strings, so lexical order follows creation order.

/// Generate a new record id
pub fn generate_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
