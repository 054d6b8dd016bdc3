use std::path::PathBuf;
use std::sync::Arc;

pub const UNSUPPORTED_FILE_MESSAGE: &str = "This command does not work for this file.";
pub const NO_ACTIVE_FILE_MESSAGE: &str = "This command is only available after a file is opened.";
pub const NOT_IMPLEMENTED_MESSAGE: &str = "Not implemented.";

/// The editor (or stand-in) hosting the commands
pub trait Host: Send + Sync {
    /// Path of the document in the focused editor, if any
    fn active_document(&self) -> Option<PathBuf>;

    fn show_information(&self, message: &str);

    fn show_warning(&self, message: &str);
}

impl<H: Host + ?Sized> Host for Arc<H> {
    fn active_document(&self) -> Option<PathBuf> {
        (**self).active_document()
    }

    fn show_information(&self, message: &str) {
        (**self).show_information(message)
    }

    fn show_warning(&self, message: &str) {
        (**self).show_warning(message)
    }
}
