use metrics::counter;

/// Increment a counter for created sites.
pub fn increment_site_created() {
    counter!("sites_created_total").increment(1);
}

/// Increment the counter for authentication attempts, labeled by outcome.
pub fn increment_auth_attempt(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("auth_attempts_total", "outcome" => outcome).increment(1);
}

/// Increment a counter for rate-limited requests.
pub fn increment_rate_limited() {
    counter!("rate_limited_total").increment(1);
}

/// Increment a counter for tab content saves.
pub fn increment_tab_saved() {
    counter!("tab_saves_total").increment(1);
}
