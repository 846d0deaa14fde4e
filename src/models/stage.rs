use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    #[default]
    Upload,
    Mcq,
    Saq,
    Submit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => write!(f, "UPLOAD"),
            Self::Mcq => write!(f, "MCQ"),
            Self::Saq => write!(f, "SAQ"),
            Self::Submit => write!(f, "SUBMIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    UploadSucceeded,
    FinishMcq,
    FinishSaq,
    SubmitSucceeded,
}

impl SessionEvent {
    pub fn all() -> [SessionEvent; 4] {
        [
            Self::UploadSucceeded,
            Self::FinishMcq,
            Self::FinishSaq,
            Self::SubmitSucceeded,
        ]
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UploadSucceeded => write!(f, "UploadSucceeded"),
            Self::FinishMcq => write!(f, "FinishMCQ"),
            Self::FinishSaq => write!(f, "FinishSAQ"),
            Self::SubmitSucceeded => write!(f, "SubmitSucceeded"),
        }
    }
}

/// The two network operations a session can have outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Upload,
    Submit,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => write!(f, "Upload"),
            Self::Submit => write!(f, "Submit"),
        }
    }
}

/// Stage transition table. Any pair not listed here is rejected.
///
/// | Current | Event           | Next   |
/// |---------|-----------------|--------|
/// | UPLOAD  | UploadSucceeded | MCQ    |
/// | MCQ     | FinishMCQ       | SAQ    |
/// | SAQ     | FinishSAQ       | SUBMIT |
/// | SUBMIT  | SubmitSucceeded | UPLOAD |
pub fn advance(current: Stage, event: SessionEvent) -> Result<Stage> {
    match (current, event) {
        (Stage::Upload, SessionEvent::UploadSucceeded) => Ok(Stage::Mcq),
        (Stage::Mcq, SessionEvent::FinishMcq) => Ok(Stage::Saq),
        (Stage::Saq, SessionEvent::FinishSaq) => Ok(Stage::Submit),
        (Stage::Submit, SessionEvent::SubmitSucceeded) => Ok(Stage::Upload),
        (stage, event) => Err(Error::InvalidTransition { stage, event }),
    }
}
