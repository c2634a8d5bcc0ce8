use ammonia;

/// Clean user-supplied text using the ammonia library.
///
/// Free-text survey answers (names, reasons, excuses) end up rendered on
/// the dashboard and inside confirmation emails, so everything is run
/// through a whitelist-based sanitizer before it is stored. Plain text
/// passes through unchanged; markup and event attributes are stripped.
pub fn clean_text(input: &str) -> String {
    ammonia::clean(input)
}
