use bp_core::BlueprintError;

/// Accepts text whose trimmed, lower-cased form starts with `sentinel`.
pub(crate) fn check_sentinel(text: &str, sentinel: &str) -> Result<(), BlueprintError> {
    let normalized = text.trim().to_lowercase();
    if normalized.starts_with(&sentinel.to_lowercase()) {
        Ok(())
    } else {
        Err(BlueprintError::missing_sentinel(sentinel))
    }
}
