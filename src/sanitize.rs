const MAX_NAME_LEN: usize = 180;

/// Makes a remote title safe to use as a single path component.
///
/// Forbidden and control characters become `_`; trailing spaces and dots are
/// trimmed. An empty or all-junk title comes back empty; the caller decides
/// what an unusable name becomes.
pub fn sanitize_file_name(input: &str) -> String {
    let trimmed = input.trim();

    let mut out = String::with_capacity(trimmed.len().min(MAX_NAME_LEN));
    for c in trimmed.chars() {
        let forbidden =
            matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control();
        out.push(if forbidden { '_' } else { c });
        if out.len() >= MAX_NAME_LEN {
            break;
        }
    }

    out.trim_matches([' ', '.']).to_string()
}
