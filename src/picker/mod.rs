// SPDX-License-Identifier: GPL-3.0-only
pub mod chooser;
pub mod native;
pub mod traits;

pub use chooser::choose_directory;
pub use native::NativeDirectoryPicker;
pub use traits::DirectoryPicker;
