mod confirm_dialog;
mod input;
mod key_result;
mod toast;

pub use confirm_dialog::{ConfirmDialog, ConfirmEvent};
pub use input::TextInput;
pub use key_result::KeyResult;
pub use toast::render_toast;
