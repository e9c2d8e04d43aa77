use crate::{
    classifier::ClassifierError,
    pages,
    preprocess::{self, PreprocessError},
    server::SharedState,
    storage::StorageError,
};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use image::ImageReader;
use std::{io::Cursor, time::Instant};
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("No file uploaded.")]
    NoFileUploaded,
    #[error("Error reading upload: {0}")]
    Multipart(String),
    #[error("Preprocessing failed. Please check the input image.")]
    Preprocess(#[from] PreprocessError),
    #[error("Prediction failed. Please check the input image.")]
    Prediction(#[from] ClassifierError),
    #[error("Error storing upload: {0}")]
    Storage(#[from] StorageError),
    #[error("Error encoding image for display: {0}")]
    Encode(String),
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        // Failures are page content, not protocol errors: the caller gets a
        // plain-text message with a 200, never the themed result page.
        (StatusCode::OK, self.to_string()).into_response()
    }
}

#[instrument(skip(state, multipart))]
pub async fn predict(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Response, PredictError> {
    state.metrics.record_request("/predict");

    let (file_name, bytes) = read_file_field(&mut multipart).await?;
    let page = handle_upload(&state, &file_name, &bytes)?;

    Ok(Html(page).into_response())
}

async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), PredictError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PredictError::Multipart(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| PredictError::Multipart(e.to_string()))?;

        return Ok((file_name, bytes));
    }

    Err(PredictError::NoFileUploaded)
}

fn handle_upload(
    state: &SharedState,
    file_name: &str,
    bytes: &[u8],
) -> Result<String, PredictError> {
    if file_name.is_empty() {
        return Err(PredictError::NoFileUploaded);
    }

    let stored_name = state.uploads.save(file_name, bytes)?;
    tracing::info!("Saved uploaded file as {}", stored_name);

    let started = Instant::now();
    let input = preprocess::normalize(bytes)?;
    state
        .metrics
        .record_preprocess_duration(started.elapsed().as_millis() as u64);

    let started = Instant::now();
    let label = state.classifier.classify(&input)?;
    state
        .metrics
        .record_inference_duration(started.elapsed().as_millis() as u64);
    state.metrics.record_prediction(label.as_str());
    tracing::info!("Predicted class: {}", label);

    let image_base64 = encode_for_display(bytes)?;

    Ok(pages::render_result(
        &stored_name,
        label.as_str(),
        &image_base64,
    ))
}

// Re-decodes the original bytes independently of the model input and
// re-encodes them as JPEG so the result page can inline them.
fn encode_for_display(bytes: &[u8]) -> Result<String, PredictError> {
    let img = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PredictError::Encode(e.to_string()))?
        .decode()
        .map_err(|e| PredictError::Encode(e.to_string()))?;

    // JPEG has no alpha channel, so flatten before encoding.
    let rgb = img.to_rgb8();
    let mut buffer = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Jpeg)
        .map_err(|e| PredictError::Encode(e.to_string()))?;

    Ok(BASE64.encode(&buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        classifier::{Classifier, ClassifierError},
        labels::TumorClass,
        storage::UploadStore,
        telemetry::Metrics,
    };
    use image::{ImageBuffer, Rgb};
    use ndarray::Array4;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tempfile::{tempdir, TempDir};

    struct MockClassifier {
        calls: AtomicUsize,
        result: TumorClass,
    }

    impl MockClassifier {
        fn new(result: TumorClass) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Classifier for MockClassifier {
        fn classify(&self, input: &Array4<f32>) -> Result<TumorClass, ClassifierError> {
            assert_eq!(input.shape(), &[1, 64, 64, 3]);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result)
        }
    }

    fn test_state(classifier: Arc<MockClassifier>) -> (SharedState, TempDir) {
        let dir = tempdir().unwrap();
        let state = SharedState {
            classifier,
            uploads: Arc::new(UploadStore::new(dir.path()).unwrap()),
            metrics: Arc::new(Metrics::new()),
        };
        (state, dir)
    }

    fn png_fixture() -> Vec<u8> {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(256, 256, Rgb([120, 80, 200]));
        let mut bytes: Vec<u8> = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_successful_upload_renders_result_page() {
        let classifier = MockClassifier::new(TumorClass::Notumor);
        let (state, dir) = test_state(classifier.clone());
        let bytes = png_fixture();

        let page = handle_upload(&state, "scan.png", &bytes).unwrap();

        assert!(page.contains("notumor"));
        assert!(page.contains("data:image/jpeg;base64,"));
        assert_eq!(classifier.call_count(), 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_empty_filename_writes_nothing_and_skips_inference() {
        let classifier = MockClassifier::new(TumorClass::Glioma);
        let (state, dir) = test_state(classifier.clone());
        let bytes = png_fixture();

        let err = handle_upload(&state, "", &bytes).unwrap_err();

        assert_eq!(err.to_string(), "No file uploaded.");
        assert_eq!(classifier.call_count(), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_malformed_bytes_report_preprocessing_failure() {
        let classifier = MockClassifier::new(TumorClass::Glioma);
        let (state, _dir) = test_state(classifier.clone());

        let err = handle_upload(&state, "junk.jpg", b"not an image at all").unwrap_err();

        assert_eq!(
            err.to_string(),
            "Preprocessing failed. Please check the input image."
        );
        assert_eq!(classifier.call_count(), 0);
    }

    #[test]
    fn test_prediction_failure_reports_fixed_message() {
        struct FailingClassifier;

        impl Classifier for FailingClassifier {
            fn classify(&self, _input: &Array4<f32>) -> Result<TumorClass, ClassifierError> {
                Err(ClassifierError::Inference("session exploded".into()))
            }
        }

        let dir = tempdir().unwrap();
        let state = SharedState {
            classifier: Arc::new(FailingClassifier),
            uploads: Arc::new(UploadStore::new(dir.path()).unwrap()),
            metrics: Arc::new(Metrics::new()),
        };

        let err = handle_upload(&state, "scan.png", &png_fixture()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Prediction failed. Please check the input image."
        );
    }

    #[test]
    fn test_stored_name_appears_on_result_page() {
        let classifier = MockClassifier::new(TumorClass::Pituitary);
        let (state, dir) = test_state(classifier);
        let bytes = png_fixture();

        let page = handle_upload(&state, "scan.png", &bytes).unwrap();

        let entry = std::fs::read_dir(dir.path()).unwrap().next().unwrap().unwrap();
        let stored_name = entry.file_name().into_string().unwrap();
        assert!(page.contains(&stored_name));
        assert!(page.contains("pituitary"));
    }

    #[test]
    fn test_encode_for_display_produces_base64_jpeg() {
        let encoded = encode_for_display(&png_fixture()).unwrap();

        let decoded = BASE64.decode(encoded).unwrap();
        // JPEG magic bytes
        assert_eq!(&decoded[..2], &[0xFF, 0xD8]);
    }
}
