//! Fixtures shared by the integration tests.
#![allow(dead_code)]

use std::path::Path;

/// Two-label model: "love" votes pop, "guitar" votes rock, ties go to pop
pub const MODEL_JSON: &str = r#"{
  "labels": ["pop", "rock"],
  "intercepts": [0.0, 0.0],
  "coefficients": {"love": [1.0, 0.0], "guitar": [0.0, 1.0]}
}"#;

pub const CATALOG_CSV: &str = "Genre,Title,Artist,preview_url\n\
pop,A,X,\n\
rock,B,Y,https://example.com/b.mp3\n\
pop,C,Z,\n";

pub const BOUNDARY: &str = "lyricsgenreboundary";

pub fn write_model(artifacts_dir: &Path) {
    std::fs::create_dir_all(artifacts_dir).unwrap();
    std::fs::write(artifacts_dir.join("pipeline_lr.json"), MODEL_JSON).unwrap();
}

/// A multipart form part
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

/// Encode parts as a `multipart/form-data` body delimited by [`BOUNDARY`]
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename, content) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: text/csv\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(content);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
