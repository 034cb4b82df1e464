mod path_validator;
mod process_runner;
mod video_scanner;
mod workspace;

pub use path_validator::{
    ensure_directory_exists, validate_directory_exists, validate_file_exists,
};
pub use process_runner::{CommandError, CommandOutput, run_command, run_piped};
pub use video_scanner::{VideoFileInfo, scan_video_files};
pub use workspace::{Workspace, is_workspace_dir_name};
