mod session_record_repo;

pub use session_record_repo::SessionRecordRepo;
