use clipsesh_errors::AppError;

const MAX_URL_LENGTH: usize = 2048;
const MAX_TEXT_LENGTH: usize = 500;
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

pub struct InputSanitizer;

impl InputSanitizer {
    /// Accept an absolute http(s) clip link and return its normalized form.
    pub fn validate_url(url: &str) -> Result<String, AppError> {
        let url = url.trim();

        if url.is_empty() {
            return Err(AppError::Validation("URL must not be empty".to_string()));
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(AppError::Validation("URL is too long".to_string()));
        }

        let parsed = url::Url::parse(url)
            .map_err(|_| AppError::Validation("Invalid URL format".to_string()))?;

        let scheme = parsed.scheme().to_lowercase();
        if !ALLOWED_SCHEMES.contains(&scheme.as_str()) {
            return Err(AppError::Validation(
                "Only HTTP and HTTPS links are allowed".to_string(),
            ));
        }

        if parsed.host_str().is_none() {
            return Err(AppError::Validation("URL must have a host".to_string()));
        }

        Ok(parsed.to_string())
    }

    /// Trimmed, control characters stripped, required non-empty.
    pub fn required_text(field: &str, value: &str) -> Result<String, AppError> {
        let cleaned: String = value
            .trim()
            .chars()
            .filter(|c| !c.is_control() || *c == '\n')
            .take(MAX_TEXT_LENGTH)
            .collect();

        if cleaned.is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
        Ok(cleaned)
    }
}
