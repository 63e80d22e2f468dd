use uuid::Uuid;

/// Generates a fresh node id.
///
/// Ids are opaque lowercase hex strings. They only need to be unique
/// within one document, but random uuids keep them unique across
/// copy/paste between documents too, so collisions never have to be
/// checked for.
pub fn fresh_id() -> String {
    Uuid::new_v4().simple().to_string()
}
