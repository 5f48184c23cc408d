use crate::catalog::ProductRecord;

/// Most results a search command replies with.
pub const MAX_RESULTS: usize = 5;

/// Products whose name or category contains `term`, case-insensitively.
pub fn search<'a>(products: &'a [ProductRecord], term: &str) -> Vec<&'a ProductRecord> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }
    products
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&term) || p.category.contains(&term))
        .take(MAX_RESULTS)
        .collect()
}

/// Products whose category contains `category`, case-insensitively.
pub fn by_category<'a>(products: &'a [ProductRecord], category: &str) -> Vec<&'a ProductRecord> {
    let category = category.trim().to_lowercase();
    if category.is_empty() {
        return Vec::new();
    }
    products
        .iter()
        .filter(|p| p.category.contains(&category))
        .take(MAX_RESULTS)
        .collect()
}
