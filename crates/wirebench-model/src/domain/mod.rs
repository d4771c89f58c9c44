mod content_kind;
pub use content_kind::ContentKind;

mod latency;
pub use latency::Latency;

mod sample;
pub use sample::SampleResult;

mod size_class;
pub use size_class::{DEFAULT_SIZE_CLASSES, PayloadSizeClass};

mod summary;
pub use summary::RunSummary;

mod worker;
pub use worker::{WorkerRecord, WorkerState};
