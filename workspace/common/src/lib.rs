//! Pure helpers shared between the backend crates.
//!
//! The only resident today is the department-name normalizer. It used to be
//! copy-pasted into every route module that compared departments, which is
//! exactly how the two copies drifted apart; it lives here once now and is
//! imported everywhere department equality is evaluated.

/// Canonicalizes a free-text department label to a single display name.
///
/// Trims and lower-cases the input, then looks it up in a fixed synonym
/// table covering the abbreviations and full names in use across the
/// system. Unknown departments pass through trimmed but otherwise
/// unchanged: free text is valid data here, not an error.
///
/// The function is pure and total; it never fails and calling it on its
/// own output is a no-op.
pub fn normalize_department(raw: &str) -> String {
    let trimmed = raw.trim();
    let key = trimmed.to_lowercase();
    match lookup_synonym(&key) {
        Some(canonical) => canonical.to_string(),
        None => trimmed.to_string(),
    }
}

fn lookup_synonym(key: &str) -> Option<&'static str> {
    let canonical = match key {
        "cse" | "cs" | "computer" | "computer science" => "Computer Science",
        "ds" | "data" | "data science" => "Data Science",
        "ce" | "civil" | "civil engineering" => "Civil Engineering",
        "me" | "mechanical" | "mechanical engineering" => "Mechanical Engineering",
        "ee" | "electrical" | "electronics" | "electrical engineering" => "Electrical Engineering",
        "mkt" | "marketing" => "Marketing",
        "fin" | "finance" => "Finance",
        "hr" | "human resource" | "human resources" => "Human Resources",
        "ops" | "operations" => "Operations",
        "sd" | "software" | "software development" => "Software Development",
        "wd" | "web" | "web development" => "Web Development",
        "db" | "database" | "database management" => "Database Management",
        "cc" | "cloud" | "cloud computing" => "Cloud Computing",
        _ => return None,
    };
    Some(canonical)
}
