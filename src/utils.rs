use crate::model::User;

/// Format an elapsed time the way the readouts show it: two decimals.
pub fn format_elapsed_ms(ms: f64) -> String {
    format!("{:.2}", ms)
}

/// Build the request URL for one page.
pub fn page_url(base_url: &str, page_size: u32, page: u32) -> String {
    format!("{}?jumlah={}&page={}", base_url, page_size, page)
}

/// Human-readable cache age, e.g. "42 detik" or "3 menit 5 detik".
pub fn describe_age(age_ms: u64) -> String {
    let total_seconds = age_ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    if minutes == 0 {
        format!("{} detik", seconds)
    } else {
        format!("{} menit {} detik", minutes, seconds)
    }
}

/// "1, 3" for a list of page numbers.
pub fn join_pages(pages: &[u32]) -> String {
    pages
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Label shown for a user row when no name field is present.
pub fn user_label(user: &User) -> String {
    match (user.name(), user.id()) {
        (Some(name), _) => name.to_string(),
        (None, Some(id)) => format!("#{}", id),
        (None, None) => user.0.to_string(),
    }
}
