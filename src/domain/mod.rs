//! Core data shapes: the types every other module passes around but none
//! of them own outright (§3 data model).

mod edit;
mod encoding_info;
mod menu;
mod video_ref;

pub use edit::{EditCut, EditList};
pub use encoding_info::{AspectRatio, EncodingInfo, Rational, ScanOrder, ScanType, Standard};
pub use menu::{MenuLayout, MenuPage};
pub use video_ref::{VideoFileSettings, VideoRef};
