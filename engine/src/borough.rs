/// Map a borough name to its DOB/DCP jurisdiction code.
///
/// Matching is case-insensitive and ignores surrounding whitespace. Unknown
/// names yield `None`.
pub fn borough_code(name: &str) -> Option<&'static str> {
    match name.trim().to_uppercase().as_str() {
        "MANHATTAN" => Some("1"),
        "BRONX" => Some("2"),
        "BROOKLYN" => Some("3"),
        "QUEENS" => Some("4"),
        "STATEN ISLAND" => Some("5"),
        _ => None,
    }
}
