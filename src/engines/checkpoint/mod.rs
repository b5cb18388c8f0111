pub mod history;
pub mod store;

pub use history::{HistoryLog, HistoryRecord};
pub use store::{
    CheckpointStore, FIRST_GEN_DIR, FIRST_PARTIAL_DIR, HISTORY_FILE_NAME, LAST_GEN_DIR, PARTIAL_GEN_DIR,
    TESTING_SET_NAME,
};
