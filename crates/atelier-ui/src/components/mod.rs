pub(crate) mod design;
pub(crate) mod download_button;
pub(crate) mod like_button;
pub(crate) mod login;
pub(crate) mod toast;
