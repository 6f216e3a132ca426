pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::{DATA_DIR_ENV, get_data_dir};
pub use paths::{collect_image_paths, format_path_with_tilde, is_image_path};
pub use terminal::{sanitize_for_terminal, single_line};
