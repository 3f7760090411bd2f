use sha2::{Digest, Sha256};

/// Calculate SHA256 checksum of file content
pub fn calculate_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Validate a folder or file name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    if name.chars().any(|c| c.is_control()) {
        return Err("Name contains control characters".to_string());
    }

    if name.contains('/') || name.contains('\\') {
        return Err("Name cannot contain path separators".to_string());
    }

    if name == "." || name == ".." {
        return Err(format!("'{}' is a reserved name", name));
    }

    Ok(())
}

/// Reduce a client supplied upload filename to its last path component.
///
/// Some browsers send the full local path (`C:\Users\me\photo.png`).
pub fn sanitize_upload_filename(filename: &str) -> Result<String, String> {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    validate_name(base)?;
    Ok(base.to_string())
}

/// Build a `Content-Disposition` value that keeps the original filename.
///
/// Plain ASCII names go out as `filename="..."`. Anything else gets an ASCII
/// fallback plus an RFC 5987 `filename*` parameter.
pub fn content_disposition_header(filename: &str) -> String {
    let needs_escaping = |c: char| !c.is_ascii() || c.is_control() || c == '"' || c == '\\';

    if !filename.chars().any(needs_escaping) {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if needs_escaping(c) { '_' } else { c })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_checksum() {
        let checksum = calculate_checksum(b"Text file 1: this is the text.\n");
        assert_eq!(checksum.len(), 64); // SHA256 produces 64 hex characters
        assert_eq!(
            calculate_checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_validate_name_valid() {
        assert!(validate_name("Folder 1").is_ok());
        assert!(validate_name("temp_file_1.txt").is_ok());
        assert!(validate_name("Фото").is_ok());
    }

    #[test]
    fn test_validate_name_invalid() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
        assert!(validate_name("line\nbreak").is_err());
        assert!(validate_name("..").is_err());
    }

    #[test]
    fn test_sanitize_upload_filename() {
        assert_eq!(sanitize_upload_filename("notes.txt").unwrap(), "notes.txt");
        assert_eq!(
            sanitize_upload_filename("C:\\Users\\me\\photo.png").unwrap(),
            "photo.png"
        );
        assert_eq!(sanitize_upload_filename("../../etc/passwd").unwrap(), "passwd");
        assert!(sanitize_upload_filename("dir/").is_err());
    }

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition_header("temp_file_1.txt"),
            "attachment; filename=\"temp_file_1.txt\""
        );
    }

    #[test]
    fn test_content_disposition_escapes() {
        let header = content_disposition_header("résumé \"v2\".pdf");
        assert!(header.starts_with("attachment; filename=\"r_sum_ _v2_.pdf\""));
        assert!(header.contains("filename*=UTF-8''r%C3%A9sum%C3%A9%20%22v2%22.pdf"));
    }
}
