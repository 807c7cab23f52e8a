pub mod allocation;
pub mod registry;
pub mod scoring_key;
pub mod validate;

pub use allocation::{
    AllocationNotConfigured, AllocationRecord, AllocationRow, AllocationTable,
    AllocationTableError, AllocationsFile, RiskProfile,
};
pub use registry::{
    read_allocations_file, read_scoring_key_file, DataRegistry, RegistryError, TableProvenance,
    TableSource, ALLOCATIONS_FILE, DATA_DIR_ENV, SCORING_KEY_FILE,
};
pub use scoring_key::{
    Choice, ScoringKey, ScoringKeyError, ScoringKeyFile, ScoringKeyRow, FIRST_QUESTION_ID,
    LAST_QUESTION_ID, QUESTION_COUNT,
};
pub use validate::{
    validate_allocation_rows, validate_data_dir, validate_scoring_key_rows, ValidationDiagnostic,
    ValidationReport, ValidationSeverity,
};
