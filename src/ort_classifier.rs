use crate::{
    classifier::{argmax, Classifier, ClassifierError},
    config::ModelConfig,
    labels::TumorClass,
};
use ndarray::Array4;
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::TensorRef,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// ONNX-backed classifier. A small pool of sessions is built once at startup
/// and dispatched round-robin, so concurrent requests do not serialize on a
/// single session mutex. The model artifact is loaded exactly once per
/// session and never reloaded.
#[derive(Clone)]
pub struct OrtClassifier {
    sessions: Arc<Vec<Arc<Mutex<Session>>>>,
    counter: Arc<AtomicUsize>,
}

impl OrtClassifier {
    pub fn new(model_config: &ModelConfig) -> Result<Self, ClassifierError> {
        ort::init().commit();

        let num_instances = model_config.num_instances;
        let sessions = (0..num_instances)
            .map(|_| {
                let session = Session::builder()?
                    .with_optimization_level(GraphOptimizationLevel::Level3)?
                    .commit_from_file(model_config.get_model_path())?;
                Ok(Arc::new(Mutex::new(session)))
            })
            .collect::<Result<Vec<_>, ort::Error>>()?;

        tracing::info!("Created {} ONNX sessions", num_instances);

        Ok(Self {
            sessions: Arc::new(sessions),
            counter: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn run_inference(&self, input: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        let index = self.counter.fetch_add(1, Ordering::SeqCst) % self.sessions.len();
        let session_arc = &self.sessions[index];
        let mut session = session_arc
            .lock()
            .map_err(|e| ClassifierError::Inference(format!("session mutex poisoned: {}", e)))?;

        tracing::debug!("Handling request with session {}", index);

        let tensor_ref = TensorRef::from_array_view(input.view())
            .map_err(|e| ClassifierError::Inference(format!("failed to build tensor: {}", e)))?;

        let input_tensor = ort::inputs![tensor_ref];

        let outputs = session
            .run(input_tensor)
            .map_err(|e| ClassifierError::Inference(format!("forward pass failed: {}", e)))?;

        let (_, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("failed to extract tensor: {}", e)))?;

        Ok(data.to_vec())
    }
}

impl Classifier for OrtClassifier {
    fn classify(&self, input: &Array4<f32>) -> Result<TumorClass, ClassifierError> {
        let scores = self.run_inference(input)?;

        if scores.len() != TumorClass::ALL.len() {
            return Err(ClassifierError::ScoreCount(
                scores.len(),
                TumorClass::ALL.len(),
            ));
        }

        let index = argmax(&scores)
            .ok_or_else(|| ClassifierError::Inference("empty prediction vector".into()))?;

        TumorClass::from_index(index)
            .ok_or_else(|| ClassifierError::Inference(format!("no label at index {}", index)))
    }
}
