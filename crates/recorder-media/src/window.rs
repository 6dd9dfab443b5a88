//! Host window-system capability.

/// Opaque native window handle supplied by the host (HWND or equivalent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub usize);

/// A child window created through [`WindowSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// Native child-window operations for embedding the preview.
pub trait WindowSystem: Send + Sync {
    /// Create a borderless child window of the given parent, sized 0x0 and
    /// hidden until configured.
    fn create_child_window(&self, parent: WindowHandle) -> Result<WindowId, String>;

    /// Move and resize the child window within its parent.
    fn set_bounds(&self, window: WindowId, x: i32, y: i32, width: u32, height: u32);

    fn show(&self, window: WindowId);
    fn hide(&self, window: WindowId);
    fn destroy(&self, window: WindowId);

    /// Native handle of the child window, for binding a GPU surface.
    fn native_handle(&self, window: WindowId) -> WindowHandle;
}
