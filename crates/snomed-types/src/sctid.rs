//! SNOMED CT Identifier (SCTID) type.
//!
//! This module provides a type alias for SNOMED CT identifiers (SCTIDs).
//! SCTIDs are modeled as signed 64-bit integers; every SCTID occurring in a
//! real distribution is positive and fits comfortably within `i64`.

/// A SNOMED CT identifier (SCTID).
///
/// SCTIDs uniquely identify components within SNOMED CT. They follow a
/// specific structure with check digits.
///
/// # Examples
///
/// ```
/// use snomed_types::SctId;
///
/// let concept_id: SctId = 73211009; // Diabetes mellitus
/// let is_a_type: SctId = 116680003; // IS_A relationship type
/// ```
pub type SctId = i64;
