//! Offline classifier.
//!
//! Usage:
//!   face-classifier <image-or-base64-file> [more files...]
//!
//! Each argument is either an image file (PNG, JPEG, BMP, GIF) or a text
//! file holding a base64 image string, optionally data-URL prefixed.  One
//! JSON result is printed per line.  Artifacts are located the same way as
//! for the server (`CLASSIFIER_ARTIFACTS_DIR` and friends).

use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};

use face_classifier::decode::decode_image_file;
use face_classifier::{classify_decoded, classify_image, logging, ArtifactStore, ClassificationResponse, ServiceConfig};

fn main() -> ExitCode {
    logging::init("face_classifier=warn");

    let inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() || inputs.iter().any(|a| a == "-h" || a == "--help") {
        eprintln!("usage: face-classifier <image-or-base64-file> [more files...]");
        return ExitCode::from(2);
    }

    let config = ServiceConfig::from_env();
    let store = ArtifactStore::new(config.artifact_paths(), config.face_detection, config.eye_detection);
    let ctx = match store.load() {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = %e, dir = %config.artifacts_dir.display(), "could not load artifacts");
            return ExitCode::FAILURE;
        }
    };

    let mut failed = false;
    for input in &inputs {
        let path = Path::new(input);
        let response = match decode_image_file(path) {
            Ok(img) => Ok(classify_decoded(&ctx, &img)),
            // Not an image container; try it as base64 text.
            Err(_) => std::fs::read_to_string(path)
                .map_err(Into::into)
                .and_then(|text| classify_image(&ctx, &text)),
        };
        match response {
            Ok(response) => {
                info!(input = %input, faces = response.face_count(), "classified");
                print_json(&response);
            }
            Err(e) => {
                error!(input = %input, error = %e, "classification failed");
                println!("{}", serde_json::json!({ "error": e.to_string() }));
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_json(response: &ClassificationResponse) {
    match serde_json::to_string(response) {
        Ok(line) => println!("{}", line),
        Err(e) => error!(error = %e, "could not serialize result"),
    }
}
