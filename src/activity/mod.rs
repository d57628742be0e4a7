pub mod aggregate;
pub mod compare;
pub mod exec;
pub mod output;

pub use aggregate::{
    aggregate_developers, aggregate_files, aggregate_logs, ordered_file_activity, DeveloperActivity,
    FileActivity,
};
pub use compare::{compare_file_activity, latest_revision};
pub use exec::{exec_developers, exec_files};
pub use output::{developer_sections, file_activity_sections};
