use super::columns;
use std::collections::HashMap;
use std::sync::OnceLock;

static COLUMN_SYNONYM_MAP: OnceLock<HashMap<String, &'static str>> = OnceLock::new();

/// Maps a raw source header onto its canonical column name. Headers with no
/// known synonym pass through trimmed but otherwise unchanged.
pub(crate) fn canonical_column(raw: &str) -> String {
    let cleaned = clean_header(raw);
    match column_synonym_map().get(&normalize_header(&cleaned)) {
        Some(canonical) => (*canonical).to_string(),
        None => cleaned,
    }
}

/// Strips BOM/zero-width characters and collapses runs of whitespace.
pub(crate) fn clean_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_header(value: &str) -> String {
    clean_header(value).to_ascii_lowercase()
}

fn column_synonym_map() -> &'static HashMap<String, &'static str> {
    COLUMN_SYNONYM_MAP.get_or_init(|| {
        const SYNONYMS: &[(&str, &str)] = &[
            // Unique key
            ("matricula", columns::EMPLOYEE_ID),
            ("employee id", columns::EMPLOYEE_ID),
            ("employee_id", columns::EMPLOYEE_ID),
            ("employee number", columns::EMPLOYEE_ID),
            ("emp id", columns::EMPLOYEE_ID),
            ("staff id", columns::EMPLOYEE_ID),
            ("badge number", columns::EMPLOYEE_ID),
            ("id", columns::EMPLOYEE_ID),
            // Company
            ("empresa", columns::COMPANY),
            ("company", columns::COMPANY),
            ("company name", columns::COMPANY),
            ("employer", columns::COMPANY),
            // Job title
            ("titulo_cargo", columns::ROLE),
            ("titulo do cargo", columns::ROLE),
            ("job title", columns::ROLE),
            ("job_title", columns::ROLE),
            ("cargo", columns::ROLE),
            ("position", columns::ROLE),
            ("role", columns::ROLE),
            ("title", columns::ROLE),
            // Employment status
            ("desc_situacao", columns::STATUS),
            ("desc. situacao", columns::STATUS),
            ("status", columns::STATUS),
            ("status description", columns::STATUS),
            ("employment status", columns::STATUS),
            ("situation", columns::STATUS),
            // Union / bargaining unit
            ("sindicato", columns::GROUP),
            ("union", columns::GROUP),
            ("union code", columns::GROUP),
            ("bargaining unit", columns::GROUP),
            ("bargaining_unit", columns::GROUP),
            ("group", columns::GROUP),
            // Base benefit value
            ("valor_beneficio_base", columns::BASE_AMOUNT),
            ("base amount", columns::BASE_AMOUNT),
            ("base_amount", columns::BASE_AMOUNT),
            ("base benefit", columns::BASE_AMOUNT),
            ("base benefit amount", columns::BASE_AMOUNT),
            ("benefit base", columns::BASE_AMOUNT),
            ("base value", columns::BASE_AMOUNT),
        ];

        let mut map = HashMap::with_capacity(SYNONYMS.len());
        for (raw, canonical) in SYNONYMS {
            map.insert(normalize_header(raw), *canonical);
        }
        map
    })
}
