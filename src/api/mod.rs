pub mod detect;
pub mod image;
pub mod presets;
pub mod process;
pub mod selective;

pub use detect::{handle_detect, DetectRequest, DetectResponse};
pub use image::WARNING_HEADER;
pub use presets::{handle_get_preset, handle_list_algorithms, handle_list_presets};
pub use process::{handle_process, ProcessRequest};
pub use selective::{build_layers, handle_selective, SelectiveRequest};
