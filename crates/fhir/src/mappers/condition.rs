//! Condition mapping: two mappers, one resource type.
//!
//! Both mappers accept every Condition and decide independently whether to append:
//! - [`ProblemListMapper`] appends a [`Problem`] when any category is `problem-list-item`
//! - [`DiagnosisMapper`] appends a [`Diagnosis`] when any category is something else, or when
//!   there is no category at all
//!
//! A Condition that is both a problem-list item and an encounter diagnosis therefore yields
//! exactly one entity in each family.

use crate::cache::ReferenceCache;
use crate::extractors::{get_code, get_display, get_system};
use crate::registry::ResourceMapper;
use crate::value::ValueExt;
use canonical::{CanonicalEntity, ClinicalContent, Diagnosis, Problem};
use serde_json::Value;

const PROBLEM_LIST_ITEM: &str = "problem-list-item";

/// Category codes of a condition (`category[].coding[0].code`).
fn category_codes(resource: &Value) -> Vec<&str> {
    resource
        .array_at("category")
        .iter()
        .filter_map(|c| c.str_at("coding.0.code"))
        .collect()
}

fn onset(resource: &Value) -> Option<String> {
    resource
        .string_at("onsetDateTime")
        .or_else(|| resource.string_at("onsetPeriod.start"))
        .or_else(|| resource.string_at("recordedDate"))
}

pub struct DiagnosisMapper;

impl ResourceMapper for DiagnosisMapper {
    fn name(&self) -> &'static str {
        "diagnosis"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Condition"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        let categories = category_codes(resource);
        if !categories.is_empty() && categories.iter().all(|c| *c == PROBLEM_LIST_ITEM) {
            return;
        }

        content.push(CanonicalEntity::Diagnosis(Diagnosis {
            code: get_code(resource),
            coding_method: get_system(resource),
            description: get_display(resource),
            onset_date: onset(resource),
            patient_id: cache.resolve_patient_id(resource),
            encounter_id: cache.resolve_encounter_id(resource),
        }));
    }
}

pub struct ProblemListMapper;

impl ResourceMapper for ProblemListMapper {
    fn name(&self) -> &'static str {
        "problem_list"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &["Condition"]
    }

    fn map(&self, resource: &Value, content: &mut ClinicalContent, cache: &mut ReferenceCache) {
        if !category_codes(resource).contains(&PROBLEM_LIST_ITEM) {
            return;
        }

        content.push(CanonicalEntity::Problem(Problem {
            code: get_code(resource),
            coding_method: get_system(resource),
            description: get_display(resource),
            onset_date: onset(resource),
            patient_id: cache.resolve_patient_id(resource),
            encounter_id: cache.resolve_encounter_id(resource),
        }));
    }
}
