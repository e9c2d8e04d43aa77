use std::fmt;

/// The four tumor classes the model was trained on, in the exact order of the
/// model's output vector. Index positions are part of the model contract and
/// must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TumorClass {
    Glioma,
    Meningioma,
    Notumor,
    Pituitary,
}

impl TumorClass {
    pub const ALL: [TumorClass; 4] = [
        TumorClass::Glioma,
        TumorClass::Meningioma,
        TumorClass::Notumor,
        TumorClass::Pituitary,
    ];

    pub fn from_index(index: usize) -> Option<TumorClass> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TumorClass::Glioma => "glioma",
            TumorClass::Meningioma => "meningioma",
            TumorClass::Notumor => "notumor",
            TumorClass::Pituitary => "pituitary",
        }
    }
}

impl fmt::Display for TumorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
