//! Static geography: province codes and the districts they contain.
//!
//! Organization-role grants reference an organization unit by short code.
//! A grant on a province implies visibility over every district of that
//! province as well as schools attached directly to the province unit.

/// Province code mapped to its district codes.
const PROVINCE_DISTRICTS: &[(&str, &[&str])] = &[
    ("ag", &["brk", "bgt", "bzm", "kpt"]),
    ("kst", &["arq", "ltn", "fdr"]),
    ("pvl", &["eks", "akk", "msk", "shr"]),
    ("trg", &["zhn", "ayt"]),
];

/// Whether the code names a province (as opposed to a district).
pub fn is_province(code: &str) -> bool {
    PROVINCE_DISTRICTS.iter().any(|(p, _)| *p == code)
}

/// Expands an organization-unit code to the full set of unit codes it
/// covers: a province expands to itself plus all of its districts, any
/// other code covers only itself.
pub fn expand_unit_code(code: &str) -> Vec<String> {
    match PROVINCE_DISTRICTS.iter().find(|(p, _)| *p == code) {
        Some((province, districts)) => {
            let mut codes = Vec::with_capacity(districts.len() + 1);
            codes.extend(districts.iter().map(|d| d.to_string()));
            codes.push(province.to_string());
            codes
        }
        None => vec![code.to_string()],
    }
}
