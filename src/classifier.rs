use crate::labels::TumorClass;
use ndarray::Array4;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("failed to build ONNX session: {0}")]
    SessionBuild(#[from] ort::Error),
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("model returned {0} scores, expected {1}")]
    ScoreCount(usize, usize),
}

/// Seam between the request handler and the model backend. The handler only
/// ever passes the `(1, 64, 64, 3)` tensor produced by `preprocess::normalize`;
/// any other shape is a caller bug.
pub trait Classifier: Send + Sync + 'static {
    fn classify(&self, input: &Array4<f32>) -> Result<TumorClass, ClassifierError>;
}

/// Index of the maximum entry; the first index wins on exact ties, matching
/// the argmax convention of the model's training stack.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    scores
        .iter()
        .copied()
        .enumerate()
        .reduce(|accum, entry| if entry.1 > accum.1 { entry } else { accum })
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_picks_highest_score() {
        let scores = [0.05, 0.10, 0.80, 0.05];
        assert_eq!(argmax(&scores), Some(2));
        assert_eq!(
            TumorClass::from_index(argmax(&scores).unwrap()),
            Some(TumorClass::Notumor)
        );
    }

    #[test]
    fn test_argmax_tie_breaks_on_first_index() {
        let scores = [0.25, 0.25, 0.25, 0.25];
        assert_eq!(argmax(&scores), Some(0));

        let scores = [0.1, 0.4, 0.4, 0.1];
        assert_eq!(argmax(&scores), Some(1));
    }

    #[test]
    fn test_argmax_empty_slice() {
        assert_eq!(argmax(&[]), None);
    }
}
