//! Wage board engine: record stores, change notifiers, file codecs and
//! effect execution.
pub mod codec;
mod engine;
mod export;
mod notify;
mod persist;
mod store;
mod types;

pub use codec::FileFormat;
pub use engine::EngineHandle;
pub use export::{export_filename, template_filename, write_export, write_template};
pub use notify::{
    parse_update_event, ChangeNotifier, HttpNotifier, MemoryNotifier, SignalFileNotifier,
    SIGNAL_FILE_NAME,
};
pub use persist::{ensure_output_dir, write_atomic, AtomicFileWriter, PersistError};
pub use store::{
    FileRecordStore, HttpRecordStore, RecordStore, CANNOT_READ, CANNOT_WRITE, DATA_NOT_FOUND,
    INVALID_JSON,
};
pub use types::{Clock, EngineConfig, EngineEvent, StoreSettings};
