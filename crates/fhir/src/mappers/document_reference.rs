//! DocumentReference mapping.
//!
//! Inline attachment data is decoded to readable text (base64 or hex, HTML stripped); a URL
//! attachment is recorded as-is.

use crate::cache::ReferenceCache;
use crate::extractors::{coding_label, extract_reference_id};
use crate::narrative::decode_narrative;
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, DocumentAuthor, DocumentReference};
use serde_json::Value;

pub struct DocumentReferenceMapper;

impl ResourceMapper for DocumentReferenceMapper {
    fn name(&self) -> &'static str {
        "document_reference"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["DocumentReference"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let attachment = Attachment::first(resource);

        let authors = resource
            .array_at("author")
            .iter()
            .filter_map(|author| {
                Some(DocumentAuthor {
                    author_id: Some(extract_reference_id(author)?),
                    author_name: author.string_at("display"),
                    author_role: None,
                })
            })
            .collect();

        content.push(CanonicalEntity::DocumentReference(DocumentReference {
            document_id: resource.string_at("id"),
            title: resource
                .string_at("description")
                .or_else(|| resource.string_at("content.0.attachment.title")),
            document_type: coding_label(resource.at("type")),
            document_class: coding_label(resource.at("category.0")),
            status: resource.string_at("status"),
            format: attachment.content_type.clone(),
            creation_date: resource
                .string_at("date")
                .or_else(|| resource.string_at("content.0.attachment.creation")),
            last_modified_date: resource.string_at("meta.lastUpdated"),
            security_label: coding_label(resource.at("securityLabel.0")),
            content_type: attachment.content_type,
            content: attachment.text,
            content_url: attachment.url,
            authors,
            related_encounters: related_encounters(resource),
            patient_id: cache.resolve_patient_id(resource),
            facility: coding_label(resource.at("context.facilityType")),
            department: coding_label(resource.at("context.practiceSetting")),
        }));
    }
}

#[derive(Default)]
struct Attachment {
    content_type: Option<String>,
    text: Option<String>,
    url: Option<String>,
}

impl Attachment {
    /// The first `content[].attachment` that yields anything.
    fn first(resource: &Value) -> Self {
        resource
            .array_at("content")
            .iter()
            .filter_map(|entry| entry.at("attachment"))
            .map(|attachment| Attachment {
                content_type: attachment.string_at("contentType"),
                text: attachment.str_at("data").and_then(decode_narrative),
                url: attachment.string_at("url"),
            })
            .find(|a| a.content_type.is_some() || a.text.is_some() || a.url.is_some())
            .unwrap_or_default()
    }
}

/// `context.encounter` may be a single reference or a list of them.
fn related_encounters(resource: &Value) -> Vec<String> {
    match resource.at("context.encounter") {
        Some(Value::Array(items)) => items.iter().filter_map(extract_reference_id).collect(),
        Some(single) => extract_reference_id(single).into_iter().collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mappers::test_support::map_one;
    use serde_json::json;

    #[test]
    fn decodes_base64_attachment_and_strips_markup() {
        // "<p>Discharge summary</p>"
        let resource = json!({
            "resourceType": "DocumentReference",
            "id": "doc-1",
            "status": "current",
            "type": {"coding": [{"code": "18842-5", "display": "Discharge summary"}]},
            "content": [{"attachment": {"contentType": "text/html", "data": "PHA+RGlzY2hhcmdlIHN1bW1hcnk8L3A+"}}],
            "author": [{"reference": "Practitioner/dr-1", "display": "Dr One"}, {"display": "unlinked"}],
            "context": {"encounter": [{"reference": "Encounter/e1"}, {"reference": "Encounter/e2"}]},
            "subject": {"reference": "Patient/p1"}
        });
        let content = map_one(&DocumentReferenceMapper, &resource);

        let doc = &content.document_references[0];
        assert_eq!(doc.document_type.as_deref(), Some("Discharge summary"));
        assert_eq!(doc.content_type.as_deref(), Some("text/html"));
        assert_eq!(doc.content.as_deref(), Some("Discharge summary"));
        assert_eq!(doc.authors.len(), 1);
        assert_eq!(doc.authors[0].author_name.as_deref(), Some("Dr One"));
        assert_eq!(doc.related_encounters, vec!["e1".to_owned(), "e2".to_owned()]);
    }

    #[test]
    fn single_encounter_reference_and_url_attachment() {
        let resource = json!({
            "resourceType": "DocumentReference",
            "content": [{"attachment": {"url": "https://docs.example.org/1.pdf"}}],
            "context": {"encounter": {"reference": "Encounter/e5"}}
        });
        let content = map_one(&DocumentReferenceMapper, &resource);

        let doc = &content.document_references[0];
        assert_eq!(doc.content_url.as_deref(), Some("https://docs.example.org/1.pdf"));
        assert_eq!(doc.content, None);
        assert_eq!(doc.related_encounters, vec!["e5".to_owned()]);
    }
}
