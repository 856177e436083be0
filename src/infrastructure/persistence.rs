use crate::domain::RequestResult;
use std::fs;

pub struct FileRepository;

impl FileRepository {
    /// Writes the request data as pretty JSON and returns the filename.
    pub fn save_request_data(data: &RequestResult, filename: &str) -> Result<String, String> {
        match serde_json::to_string_pretty(data) {
            Ok(json) => match fs::write(filename, &json) {
                Ok(_) => Ok(filename.to_string()),
                Err(e) => Err(e.to_string()),
            },
            Err(e) => Err(format!("Serialization failed: {}", e)),
        }
    }
}
