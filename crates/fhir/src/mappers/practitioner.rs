//! Practitioner mapping.

use crate::cache::ReferenceCache;
use crate::dates::{date_at, datetime_at};
use crate::extractors::{
    address_parts, extract_coding, extract_reference_id, identifier_map, string_list,
    telecom_values,
};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, Practitioner, PractitionerQualification};
use serde_json::Value;

pub struct PractitionerMapper;

impl ResourceMapper for PractitionerMapper {
    fn name(&self) -> &'static str {
        "practitioner"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Practitioner"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, _cache: &mut ReferenceCache) {
        let name = NameParts::from_first(resource);
        let address = address_parts(resource.at("address.0"));

        content.push(CanonicalEntity::Practitioner(Practitioner {
            id: resource.string_at("id"),
            active: resource.bool_at("active"),
            full_name: name.full(),
            name_prefix: name.prefix,
            first_name: name.first,
            middle_name: name.middle,
            last_name: name.last,
            name_suffix: name.suffix,
            gender: resource.string_at("gender"),
            birth_date: date_at(resource, "birthDate"),
            address_line: address.lines,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            telecom: telecom_values(resource),
            qualifications: resource
                .array_at("qualification")
                .iter()
                .map(qualification)
                .collect(),
            communication_languages: resource
                .array_at("communication")
                .iter()
                .filter(|c| !c.array_at("coding").is_empty())
                .filter_map(|c| extract_coding(Some(c)).display)
                .collect(),
            identifiers: identifier_map(resource),
        }));
    }
}

/// The first `name[]` entry split into its parts. Extra given names form the middle name.
#[derive(Default)]
struct NameParts {
    prefix: Option<String>,
    first: Option<String>,
    middle: Option<String>,
    last: Option<String>,
    suffix: Option<String>,
}

impl NameParts {
    fn from_first(resource: &Value) -> Self {
        let Some(name) = resource.at("name.0") else {
            return Self::default();
        };
        let joined = |path: &str| {
            let parts = string_list(name, path);
            (!parts.is_empty()).then(|| parts.join(" "))
        };
        let given = string_list(name, "given");

        NameParts {
            prefix: joined("prefix"),
            first: given.first().cloned(),
            middle: (given.len() > 1).then(|| given[1..].join(" ")),
            last: name.string_at("family"),
            suffix: joined("suffix"),
        }
    }

    fn full(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.prefix, &self.first, &self.middle, &self.last, &self.suffix]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

fn qualification(qualification: &Value) -> PractitionerQualification {
    let code = extract_coding(qualification.at("code"));
    PractitionerQualification {
        code: code.code,
        code_system: code.system,
        display: code.display,
        issuer: qualification.at("issuer").and_then(extract_reference_id),
        identifier: qualification.string_at("identifier.0.value"),
        period_start: datetime_at(qualification, "period.start"),
        period_end: datetime_at(qualification, "period.end"),
    }
}
