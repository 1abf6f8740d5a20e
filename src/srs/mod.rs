//! Round selection and the study round runner.

pub mod assessment;
pub mod metrics;
pub mod round;
pub mod round_selector;
pub mod store;
pub mod summary;

pub use assessment::{Assessment, ChoiceAssessment, SelfAssessment};
pub use metrics::{CardMetrics, NoopMetrics};
pub use round::{ActiveRound, ChoiceRound, FlippableRound, RoundPorts, StudyRound};
pub use round_selector::{clamp_round_length, select_round, DEFAULT_ROUND_LENGTH};
pub use store::{MemoryStore, ProgressStore, RoundSnapshot, StoreError};
pub use summary::{round_summary, RoundSummary};
