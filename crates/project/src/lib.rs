//! Cell notebook model and the JSON manifest (`file.imgnb`) that persists it.
//! 儲存格筆記本模型，以及保存它的 JSON 清單檔（`file.imgnb`）。

mod util;

pub mod notebook;
pub mod store;

pub use notebook::{Cell, CellUpdate, Notebook, NotebookError, DEFAULT_LANGUAGE};
pub use store::{
    LoadOutcome, LoadStatus, ProjectStore, ProjectStoreError, IMAGES_DIR_NAME, MANIFEST_FILE_NAME,
};
