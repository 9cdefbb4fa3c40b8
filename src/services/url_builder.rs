//! Public endpoint URL rendering

/// `https://{line_display_name}.{domain_name}/{path}.flv`, without validation
pub fn build_endpoint_url(line_display_name: &str, domain_name: &str, path: &str) -> String {
    format!("https://{line_display_name}.{domain_name}/{path}.flv")
}
