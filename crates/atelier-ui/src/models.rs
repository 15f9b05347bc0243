//! View models shared by components.

/// Maximum number of toasts kept on screen.
pub const MAX_TOASTS: usize = 4;

/// Toast variants used across the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    /// Informational toast.
    Info,
    /// Success toast.
    Success,
    /// Error toast.
    Error,
}

/// Toast payload used by the host and app state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    /// Monotonic toast identifier.
    pub id: u64,
    /// Display message for the toast.
    pub message: String,
    /// Severity classification.
    pub kind: ToastKind,
}

/// Append `toast`, dropping the oldest entries beyond [`MAX_TOASTS`].
#[must_use]
pub fn queue_toast(list: &[Toast], toast: Toast) -> Vec<Toast> {
    let mut next = list.to_vec();
    next.push(toast);
    if next.len() > MAX_TOASTS {
        let drain = next.len() - MAX_TOASTS;
        next.drain(0..drain);
    }
    next
}

/// Remove the toast with `id`.
#[must_use]
pub fn dismiss_toast(list: &[Toast], id: u64) -> Vec<Toast> {
    list.iter().filter(|toast| toast.id != id).cloned().collect()
}
