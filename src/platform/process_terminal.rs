//! Raw-mode terminal on the process's stdin/stdout.

use std::io;
use std::panic;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use libc::{self, c_int};
use signal_hook::iterator::{Handle as SignalsHandle, Signals};
use tracing::{debug, warn};

use crate::core::terminal::Terminal;

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const INPUT_POLL_MS: c_int = 50;
const FALLBACK_SIZE: (u16, u16) = (80, 24);

type InputHandler = Arc<Mutex<Option<Box<dyn FnMut(String) + Send>>>>;
type ResizeHandler = Arc<Mutex<Option<Box<dyn FnMut() + Send>>>>;

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn now_ms() -> u64 {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    u64::try_from(since_epoch.as_millis()).unwrap_or(u64::MAX)
}

/// `poll(2)` on a single descriptor. `Ok(true)` once `events` are ready,
/// `Ok(false)` on timeout. `EINTR` is retried.
fn poll_fd(fd: c_int, events: libc::c_short, timeout_ms: c_int) -> io::Result<bool> {
    let mut entry = libc::pollfd {
        fd,
        events,
        revents: 0,
    };
    loop {
        match unsafe { libc::poll(&mut entry, 1, timeout_ms) } {
            0 => return Ok(false),
            n if n < 0 => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err);
                }
            }
            _ if entry.revents & events != 0 => return Ok(true),
            _ => {
                return Err(io::Error::other(format!(
                    "poll on fd {fd} reported revents=0x{:x}",
                    entry.revents
                )))
            }
        }
    }
}

/// Writes every byte, retrying on `EINTR` and waiting out `EAGAIN`.
fn write_all_fd_with<W, P>(fd: c_int, bytes: &[u8], mut write_once: W, mut park: P) -> io::Result<()>
where
    W: FnMut(c_int, &[u8]) -> io::Result<usize>,
    P: FnMut(c_int) -> io::Result<()>,
{
    let mut rest = bytes;
    while !rest.is_empty() {
        match write_once(fd, rest) {
            Ok(0) => return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0")),
            Ok(count) => rest = &rest[count.min(rest.len())..],
            Err(err) => match err.kind() {
                io::ErrorKind::Interrupted => {}
                io::ErrorKind::WouldBlock => park(fd)?,
                _ => return Err(err),
            },
        }
    }
    Ok(())
}

fn write_fd(fd: c_int, data: &str) -> io::Result<()> {
    let write_once = |fd: c_int, buf: &[u8]| {
        let written = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };
        usize::try_from(written).map_err(|_| io::Error::last_os_error())
    };
    let park = |fd: c_int| poll_fd(fd, libc::POLLOUT, -1).map(drop);
    write_all_fd_with(fd, data.as_bytes(), write_once, park)
}

/// `(columns, rows)` of the terminal behind `fd`, if it reports one.
fn window_size(fd: c_int) -> Option<(u16, u16)> {
    let mut size = unsafe { std::mem::zeroed::<libc::winsize>() };
    let ok = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) } == 0;
    (ok && size.ws_col > 0 && size.ws_row > 0).then_some((size.ws_col, size.ws_row))
}

/// Saved or derived line discipline settings for one descriptor.
#[derive(Clone, Copy)]
struct Termios(libc::termios);

impl Termios {
    fn read(fd: c_int) -> io::Result<Self> {
        let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
        if unsafe { libc::tcgetattr(fd, &mut termios) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self(termios))
    }

    fn apply(&self, fd: c_int) -> io::Result<()> {
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &self.0) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Raw input with output post-processing left on, so `\n` still returns
    /// the carriage in log-style output.
    fn raw(mut self) -> Self {
        unsafe { libc::cfmakeraw(&mut self.0) };
        self.0.c_oflag |= libc::OPOST;
        self
    }
}

/// Shareable handle that puts the terminal back into cooked mode.
///
/// Panic and signal paths hold a clone so they can restore the terminal
/// without owning the [`ProcessTerminal`].
#[derive(Clone)]
pub struct RestoreHandle {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original: Arc<Mutex<Option<Termios>>>,
}

impl RestoreHandle {
    /// Shows the cursor and restores the saved termios. Safe to call repeatedly.
    pub fn restore(&self) {
        let original = lock_unpoisoned(&self.original).take();
        if let Some(original) = original {
            let _ = write_fd(self.stdout_fd, SHOW_CURSOR);
            if let Err(err) = original.apply(self.stdin_fd) {
                warn!(%err, "failed to restore terminal mode");
            }
        }
    }
}

pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original: Arc<Mutex<Option<Termios>>>,
    input_handler: InputHandler,
    resize_handler: ResizeHandler,
    input_thread: Option<JoinHandle<()>>,
    stop_flag: Arc<AtomicBool>,
    drain_mode: Arc<AtomicBool>,
    last_input_time: Arc<AtomicU64>,
    resize_signals: Option<SignalsHandle>,
    resize_thread: Option<JoinHandle<()>>,
}

impl ProcessTerminal {
    pub fn new() -> Self {
        Self {
            stdin_fd: libc::STDIN_FILENO,
            stdout_fd: libc::STDOUT_FILENO,
            original: Arc::new(Mutex::new(None)),
            input_handler: Arc::new(Mutex::new(None)),
            resize_handler: Arc::new(Mutex::new(None)),
            input_thread: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            drain_mode: Arc::new(AtomicBool::new(false)),
            last_input_time: Arc::new(AtomicU64::new(now_ms())),
            resize_signals: None,
            resize_thread: None,
        }
    }

    pub fn restore_handle(&self) -> RestoreHandle {
        RestoreHandle {
            stdin_fd: self.stdin_fd,
            stdout_fd: self.stdout_fd,
            original: Arc::clone(&self.original),
        }
    }

    fn enable_raw_mode(&mut self) -> io::Result<()> {
        let mut original = lock_unpoisoned(&self.original);
        let saved = match *original {
            Some(saved) => saved,
            None => *original.insert(Termios::read(self.stdin_fd)?),
        };
        saved.raw().apply(self.stdin_fd)
    }

    fn start_input_thread(&mut self) -> io::Result<()> {
        let stdin_fd = self.stdin_fd;
        let handler = Arc::clone(&self.input_handler);
        let stop_flag = Arc::clone(&self.stop_flag);
        let drain_mode = Arc::clone(&self.drain_mode);
        let last_input_time = Arc::clone(&self.last_input_time);

        let thread = thread::Builder::new()
            .name("terminal-input".to_string())
            .spawn(move || {
                let mut buffer = [0u8; 4096];
                while !stop_flag.load(Ordering::SeqCst) {
                    if !poll_fd(stdin_fd, libc::POLLIN, INPUT_POLL_MS).unwrap_or(false) {
                        continue;
                    }
                    let read = unsafe { libc::read(stdin_fd, buffer.as_mut_ptr().cast(), buffer.len()) };
                    let len = match usize::try_from(read) {
                        Ok(len) if len > 0 => len,
                        _ => continue,
                    };
                    last_input_time.store(now_ms(), Ordering::SeqCst);
                    if drain_mode.load(Ordering::SeqCst) {
                        continue;
                    }

                    let data = String::from_utf8_lossy(&buffer[..len]).into_owned();
                    if let Some(handler) = lock_unpoisoned(&handler).as_mut() {
                        handler(data);
                    }
                }
            })?;
        self.input_thread = Some(thread);
        Ok(())
    }

    fn stop_input_thread(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(thread) = self.input_thread.take() {
            let _ = thread.join();
        }
    }

    fn start_resize_thread(&mut self) -> io::Result<()> {
        let mut signals = Signals::new([libc::SIGWINCH])?;
        let handle = signals.handle();
        let resize_handler = Arc::clone(&self.resize_handler);

        let thread = thread::Builder::new()
            .name("terminal-resize".to_string())
            .spawn(move || {
                for _ in signals.forever() {
                    if let Some(handler) = lock_unpoisoned(&resize_handler).as_mut() {
                        handler();
                    }
                }
            })?;

        self.resize_signals = Some(handle);
        self.resize_thread = Some(thread);
        Ok(())
    }

    fn stop_resize_thread(&mut self) {
        if let Some(handle) = self.resize_signals.take() {
            handle.close();
        }
        if let Some(thread) = self.resize_thread.take() {
            let _ = thread.join();
        }
    }

    fn clear_handlers(&self) {
        *lock_unpoisoned(&self.input_handler) = None;
        *lock_unpoisoned(&self.resize_handler) = None;
    }
}

impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for ProcessTerminal {
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(String) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> io::Result<()> {
        *lock_unpoisoned(&self.input_handler) = Some(on_input);
        *lock_unpoisoned(&self.resize_handler) = Some(on_resize);

        self.stop_flag.store(false, Ordering::SeqCst);
        self.drain_mode.store(false, Ordering::SeqCst);
        self.last_input_time.store(now_ms(), Ordering::SeqCst);

        if let Err(err) = self.enable_raw_mode() {
            self.clear_handlers();
            return Err(err);
        }

        let started = self
            .start_resize_thread()
            .and_then(|()| self.start_input_thread());
        if let Err(err) = started {
            let _ = self.stop();
            return Err(err);
        }

        self.write(HIDE_CURSOR);
        debug!(
            columns = self.columns(),
            rows = self.rows(),
            "terminal started in raw mode"
        );
        Ok(())
    }

    fn stop(&mut self) -> io::Result<()> {
        self.stop_input_thread();
        self.stop_resize_thread();
        self.clear_handlers();

        // drop buffered input before leaving raw mode
        let _ = unsafe { libc::tcflush(self.stdin_fd, libc::TCIFLUSH) };

        self.restore_handle().restore();
        Ok(())
    }

    /// Swallows keys typed during teardown until input has been quiet for
    /// `idle_ms`, for at most `max_ms`.
    fn drain_input(&mut self, max_ms: u64, idle_ms: u64) {
        self.drain_mode.store(true, Ordering::SeqCst);
        self.last_input_time.store(now_ms(), Ordering::SeqCst);

        let deadline = now_ms().saturating_add(max_ms);
        let mut now = now_ms();
        while now < deadline {
            let quiet_for = now.saturating_sub(self.last_input_time.load(Ordering::SeqCst));
            if quiet_for >= idle_ms {
                break;
            }
            let nap = (idle_ms - quiet_for).min(deadline - now).max(1);
            thread::sleep(Duration::from_millis(nap));
            now = now_ms();
        }

        self.drain_mode.store(false, Ordering::SeqCst);
    }

    fn write(&mut self, data: &str) {
        if let Err(err) = write_fd(self.stdout_fd, data) {
            warn!(%err, "terminal write failed");
        }
    }

    fn columns(&self) -> u16 {
        window_size(self.stdout_fd).map_or(FALLBACK_SIZE.0, |(columns, _)| columns)
    }

    fn rows(&self) -> u16 {
        window_size(self.stdout_fd).map_or(FALLBACK_SIZE.1, |(_, rows)| rows)
    }
}

impl Drop for ProcessTerminal {
    fn drop(&mut self) {
        if self.input_thread.is_some() || self.resize_thread.is_some() {
            let _ = self.stop();
        }
    }
}

/// Keeps the signal listener thread alive; dropping it unregisters.
pub struct SignalHookGuard {
    handle: SignalsHandle,
    thread: Option<JoinHandle<()>>,
}

impl Drop for SignalHookGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Signals that end a run: SIGINT, SIGTERM and SIGHUP.
pub const EXIT_SIGNALS: [c_int; 3] = [libc::SIGINT, libc::SIGTERM, libc::SIGHUP];

/// Calls `on_signal` with the signal number for every exit signal received.
pub fn install_signal_handlers<F>(on_signal: F) -> io::Result<SignalHookGuard>
where
    F: Fn(c_int) + Send + 'static,
{
    let mut signals = Signals::new(EXIT_SIGNALS)?;
    let handle = signals.handle();
    let thread = thread::Builder::new()
        .name("exit-signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                on_signal(signal);
            }
        })?;

    Ok(SignalHookGuard {
        handle,
        thread: Some(thread),
    })
}

/// Runs `cleanup` once on the first panic, then delegates to the previous hook.
pub fn install_panic_hook<F>(cleanup: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let ran = AtomicBool::new(false);
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if !ran.swap(true, Ordering::SeqCst) {
            cleanup();
        }
        previous(info);
    }));
}
