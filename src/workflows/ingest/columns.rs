//! Canonical column names shared by ingestion and the benefits engine.
//!
//! Source files spell these in many historical ways; the normalizer collapses
//! the known synonyms onto these names and passes everything else through
//! unchanged.

pub const EMPLOYEE_ID: &str = "employee_id";
pub const COMPANY: &str = "company";
pub const ROLE: &str = "role";
pub const STATUS: &str = "status";
pub const GROUP: &str = "group";
pub const BASE_AMOUNT: &str = "base_amount";

pub const CANONICAL: &[&str] = &[EMPLOYEE_ID, COMPANY, ROLE, STATUS, GROUP, BASE_AMOUNT];

pub fn is_canonical(name: &str) -> bool {
    CANONICAL.contains(&name)
}
