pub mod analyze;
pub mod artifact;
pub mod backup_config;
pub mod compress;
pub mod database;
pub mod definition;
pub mod file_ext;
pub mod options;
pub mod pipeline;
pub mod process;
pub mod redacted;
pub mod result_error;
pub mod runner;
pub mod storage;
pub mod validate;

#[cfg(all(test, unix))]
pub(crate) mod test_util;

macro_rules! function_path {
    () => {
        concat!(module_path!(), "::", function_name!(), " ", file!(), ":", line!())
    };
}

pub(crate) use function_path;
