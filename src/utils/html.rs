// src/utils/html.rs

/// Sanitizes rich question text authored through the admin surface.
///
/// Whitelist-based: formatting tags such as <b>, <p> and <code> survive,
/// <script>/<iframe> (including their content) and event-handler
/// attributes are removed.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
