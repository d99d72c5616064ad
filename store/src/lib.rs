pub mod config;
pub mod memory;
pub mod provider;
pub mod supabase;
pub mod types;

pub use config::{SupabaseConfig, TESTING_IMAGES_BUCKET};
pub use memory::{MemoryStore, StoredObject};
pub use provider::{
    insert_record, select_records, Backend, BlobStore, OrderBy, RecordStore, StoreError,
    StoreResult, UploadOptions,
};
pub use supabase::SupabaseProvider;
pub use types::{
    AuthTests, CaseSection, InternalTestingCase, LeaderboardResult, LeaderboardType,
    MainSectionTests, QaTestReport, RecordId, SectionRecord, SideMissionTests, Table, TestItem,
    TestResult, TestStatus,
};

pub mod prelude {
    pub use crate::config::*;
    pub use crate::memory::*;
    pub use crate::provider::*;
    pub use crate::supabase::*;
    pub use crate::types::*;
}
