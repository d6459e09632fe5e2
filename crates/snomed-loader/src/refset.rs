//! RF2 Reference Set parser implementations.
//!
//! This module provides parsers for simple, language, association, simple
//! map, and complex map reference sets.

use csv::StringRecord;
use snomed_types::{
    Rf2AssociationRefsetMember, Rf2ComplexMapMember, Rf2LanguageRefsetMember,
    Rf2SimpleMapMember, Rf2SimpleRefsetMember,
};
use uuid::Uuid;

use crate::parser::{parse, Rf2Record};
use crate::types::{Rf2Config, Rf2Error, Rf2Result};

/// Parses a reference set member id, which is a UUID rather than an SCTID.
fn member_uuid(value: &str) -> Rf2Result<Uuid> {
    Uuid::parse_str(value).map_err(|_| Rf2Error::InvalidUuid {
        value: value.to_string(),
    })
}

/// Expected columns for simple reference set files.
const SIMPLE_REFSET_COLUMNS: &[&str] = &[
    "id",
    "effectiveTime",
    "active",
    "moduleId",
    "refsetId",
    "referencedComponentId",
];

/// Expected columns for language reference set files.
const LANGUAGE_REFSET_COLUMNS: &[&str] = &[
    "id",
    "effectiveTime",
    "active",
    "moduleId",
    "refsetId",
    "referencedComponentId",
    "acceptabilityId",
];

/// Expected columns for association reference set files.
const ASSOCIATION_REFSET_COLUMNS: &[&str] = &[
    "id",
    "effectiveTime",
    "active",
    "moduleId",
    "refsetId",
    "referencedComponentId",
    "targetComponentId",
];

/// Expected columns for simple map reference set files.
const SIMPLE_MAP_REFSET_COLUMNS: &[&str] = &[
    "id",
    "effectiveTime",
    "active",
    "moduleId",
    "refsetId",
    "referencedComponentId",
    "mapTarget",
];

/// Expected columns for complex map reference set files.
const COMPLEX_MAP_REFSET_COLUMNS: &[&str] = &[
    "id",
    "effectiveTime",
    "active",
    "moduleId",
    "refsetId",
    "referencedComponentId",
    "mapGroup",
    "mapPriority",
    "mapRule",
    "mapAdvice",
    "mapTarget",
    "correlationId",
];

impl Rf2Record for Rf2SimpleRefsetMember {
    const EXPECTED_COLUMNS: &'static [&'static str] = SIMPLE_REFSET_COLUMNS;

    fn from_record(record: &StringRecord) -> Rf2Result<Self> {
        Ok(Self {
            id: member_uuid(record.get(0).unwrap_or(""))?,
            effective_time: parse::effective_time(record.get(1).unwrap_or(""))?,
            active: parse::boolean(record.get(2).unwrap_or(""))?,
            module_id: parse::sctid(record.get(3).unwrap_or(""))?,
            refset_id: parse::sctid(record.get(4).unwrap_or(""))?,
            referenced_component_id: parse::sctid(record.get(5).unwrap_or(""))?,
        })
    }

    fn passes_filter(&self, config: &Rf2Config) -> bool {
        if config.active_only && !self.active {
            return false;
        }
        true
    }
}

impl Rf2Record for Rf2LanguageRefsetMember {
    const EXPECTED_COLUMNS: &'static [&'static str] = LANGUAGE_REFSET_COLUMNS;

    fn from_record(record: &StringRecord) -> Rf2Result<Self> {
        Ok(Self {
            id: member_uuid(record.get(0).unwrap_or(""))?,
            effective_time: parse::effective_time(record.get(1).unwrap_or(""))?,
            active: parse::boolean(record.get(2).unwrap_or(""))?,
            module_id: parse::sctid(record.get(3).unwrap_or(""))?,
            refset_id: parse::sctid(record.get(4).unwrap_or(""))?,
            referenced_component_id: parse::sctid(record.get(5).unwrap_or(""))?,
            acceptability_id: parse::sctid(record.get(6).unwrap_or(""))?,
        })
    }

    fn passes_filter(&self, config: &Rf2Config) -> bool {
        if config.active_only && !self.active {
            return false;
        }
        true
    }
}

impl Rf2Record for Rf2AssociationRefsetMember {
    const EXPECTED_COLUMNS: &'static [&'static str] = ASSOCIATION_REFSET_COLUMNS;

    fn from_record(record: &StringRecord) -> Rf2Result<Self> {
        Ok(Self {
            id: member_uuid(record.get(0).unwrap_or(""))?,
            effective_time: parse::effective_time(record.get(1).unwrap_or(""))?,
            active: parse::boolean(record.get(2).unwrap_or(""))?,
            module_id: parse::sctid(record.get(3).unwrap_or(""))?,
            refset_id: parse::sctid(record.get(4).unwrap_or(""))?,
            referenced_component_id: parse::sctid(record.get(5).unwrap_or(""))?,
            target_component_id: parse::sctid(record.get(6).unwrap_or(""))?,
        })
    }

    fn passes_filter(&self, config: &Rf2Config) -> bool {
        if config.active_only && !self.active {
            return false;
        }
        true
    }
}

impl Rf2Record for Rf2SimpleMapMember {
    const EXPECTED_COLUMNS: &'static [&'static str] = SIMPLE_MAP_REFSET_COLUMNS;

    fn from_record(record: &StringRecord) -> Rf2Result<Self> {
        Ok(Self {
            id: member_uuid(record.get(0).unwrap_or(""))?,
            effective_time: parse::effective_time(record.get(1).unwrap_or(""))?,
            active: parse::boolean(record.get(2).unwrap_or(""))?,
            module_id: parse::sctid(record.get(3).unwrap_or(""))?,
            refset_id: parse::sctid(record.get(4).unwrap_or(""))?,
            referenced_component_id: parse::sctid(record.get(5).unwrap_or(""))?,
            map_target: record.get(6).unwrap_or("").to_string(),
        })
    }

    fn passes_filter(&self, config: &Rf2Config) -> bool {
        if config.active_only && !self.active {
            return false;
        }
        true
    }
}

impl Rf2Record for Rf2ComplexMapMember {
    const EXPECTED_COLUMNS: &'static [&'static str] = COMPLEX_MAP_REFSET_COLUMNS;

    fn from_record(record: &StringRecord) -> Rf2Result<Self> {
        Ok(Self {
            id: member_uuid(record.get(0).unwrap_or(""))?,
            effective_time: parse::effective_time(record.get(1).unwrap_or(""))?,
            active: parse::boolean(record.get(2).unwrap_or(""))?,
            module_id: parse::sctid(record.get(3).unwrap_or(""))?,
            refset_id: parse::sctid(record.get(4).unwrap_or(""))?,
            referenced_component_id: parse::sctid(record.get(5).unwrap_or(""))?,
            map_group: parse::integer::<u8>(record.get(6).unwrap_or(""))?,
            map_priority: parse::integer::<u8>(record.get(7).unwrap_or(""))?,
            map_rule: record.get(8).unwrap_or("").to_string(),
            map_advice: record.get(9).unwrap_or("").to_string(),
            map_target: record.get(10).unwrap_or("").to_string(),
            correlation_id: parse::sctid(record.get(11).unwrap_or(""))?,
        })
    }

    fn passes_filter(&self, config: &Rf2Config) -> bool {
        if config.active_only && !self.active {
            return false;
        }
        true
    }
}
