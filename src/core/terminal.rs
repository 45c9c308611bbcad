//! Terminal trait.

/// The terminal a frame is drawn on. [`crate::ProcessTerminal`] drives the
/// real one; tests substitute a recording fake.
pub trait Terminal {
    /// Enters raw mode and starts delivering input chunks and resize
    /// notifications to the handlers.
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> std::io::Result<()>;

    /// Stops delivery and restores the saved terminal mode.
    fn stop(&mut self) -> std::io::Result<()>;

    /// Discards keys typed during teardown so they do not reach the shell.
    fn drain_input(&mut self, max_ms: u64, idle_ms: u64);

    fn write(&mut self, data: &str);

    fn columns(&self) -> u16;
    fn rows(&self) -> u16;
}
