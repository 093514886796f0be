use crate::error::AppError;

/// Minimum visible length of a post or comment after sanitizing.
pub const MIN_TEXT_CHARS: usize = 3;

/// Sanitizes user-supplied post text with ammonia.
///
/// Safe inline tags survive; `<script>` and friends are removed together
/// with their content. The length rule applies to the text a reader sees,
/// so markup and entity escapes do not count towards it.
pub fn clean_post_text(input: &str) -> Result<String, AppError> {
    let cleaned = ammonia::clean(input);
    let trimmed = cleaned.trim();
    if visible_chars(trimmed) < MIN_TEXT_CHARS {
        return Err(AppError::BadRequest(format!(
            "Post must be at least {} characters long",
            MIN_TEXT_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

/// Counts the characters of sanitized HTML as rendered.
///
/// Input must be ammonia output, whose text never holds a raw `<` or `&`:
/// each `<` opens a tag and each `&` opens an entity rendering as one
/// character.
fn visible_chars(html: &str) -> usize {
    let mut visible = String::with_capacity(html.len());
    let mut chars = html.chars();
    while let Some(c) = chars.next() {
        match c {
            '<' => {
                // Attribute values are always double-quoted and may hold '>'.
                let mut quoted = false;
                for c in chars.by_ref() {
                    match c {
                        '"' => quoted = !quoted,
                        '>' if !quoted => break,
                        _ => {}
                    }
                }
            }
            '&' => {
                chars.by_ref().find(|&c| c == ';');
                visible.push('&');
            }
            _ => visible.push(c),
        }
    }
    visible.trim().chars().count()
}
