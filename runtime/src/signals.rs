//! Signal-driven lifecycle flags.
//!
//! SIGHUP sets "reload requested" and writes a notice straight to fd 1.
//! SIGINT and SIGTERM clear "running". Handlers only touch atomics and make at
//! most one raw `write(2)`; the read-eval loop polls the flags between lines.
//!
//! Handlers are installed without `SA_RESTART`, so a blocking read on stdin
//! returns `EINTR` when a signal lands. [`SignalAwareReader`] turns that into
//! end-of-input once shutdown has been requested and retries otherwise.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};

const RELOAD_MESSAGE: &[u8] = b"Configuration reloaded\n";

/// The two lifecycle flags.
#[derive(Debug)]
pub struct SignalState {
    running: AtomicBool,
    reload_requested: AtomicBool,
}

impl SignalState {
    const fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            reload_requested: AtomicBool::new(false),
        }
    }
}

/// Flags written by the installed OS handlers.
static PROCESS_SIGNALS: SignalState = SignalState::new();

extern "C" fn handle_reload(_signum: libc::c_int) {
    // SAFETY: write(2) is async-signal-safe and the buffer is static.
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            RELOAD_MESSAGE.as_ptr().cast(),
            RELOAD_MESSAGE.len(),
        );
    }
    PROCESS_SIGNALS
        .reload_requested
        .store(true, Ordering::SeqCst);
}

extern "C" fn handle_shutdown(_signum: libc::c_int) {
    PROCESS_SIGNALS.running.store(false, Ordering::SeqCst);
}

/// Read side of the lifecycle flags, polled by the read-eval loop.
#[derive(Debug, Clone, Copy)]
pub struct SignalController {
    state: &'static SignalState,
}

impl SignalController {
    /// Reset the process flags and install the SIGHUP/SIGINT/SIGTERM handlers.
    pub fn install() -> io::Result<Self> {
        PROCESS_SIGNALS.running.store(true, Ordering::SeqCst);
        PROCESS_SIGNALS
            .reload_requested
            .store(false, Ordering::SeqCst);

        install_handler(libc::SIGHUP, handle_reload)?;
        install_handler(libc::SIGINT, handle_shutdown)?;
        install_handler(libc::SIGTERM, handle_shutdown)?;
        log::debug!("signal handlers installed");

        Ok(Self {
            state: &PROCESS_SIGNALS,
        })
    }

    /// A controller with private flags, not wired to any OS signal.
    ///
    /// For driving a shell programmatically; the state lives for the rest of
    /// the process.
    pub fn unregistered() -> Self {
        Self {
            state: Box::leak(Box::new(SignalState::new())),
        }
    }

    /// False once SIGINT or SIGTERM has been delivered.
    pub fn running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    /// Clear and return the reload flag.
    pub fn take_reload(&self) -> bool {
        self.state.reload_requested.swap(false, Ordering::SeqCst)
    }

    /// Clear the running flag from regular (non-handler) code.
    pub fn request_shutdown(&self) {
        self.state.running.store(false, Ordering::SeqCst);
    }

    /// Set the reload flag from regular (non-handler) code.
    pub fn request_reload(&self) {
        self.state.reload_requested.store(true, Ordering::SeqCst);
    }
}

fn install_handler(signum: libc::c_int, handler: extern "C" fn(libc::c_int)) -> io::Result<()> {
    // SAFETY: the sigaction struct is fully initialised before use and the
    // handler only performs async-signal-safe operations.
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = handler as libc::sighandler_t;
        action.sa_flags = 0;
        libc::sigemptyset(&mut action.sa_mask);
        if libc::sigaction(signum, &action, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

/// Reader that treats `EINTR` as "check the shutdown flag".
///
/// Interrupted reads are retried while the shell is running and reported as
/// end of input once it is not.
pub struct SignalAwareReader<R> {
    inner: R,
    signals: SignalController,
}

impl<R> SignalAwareReader<R> {
    pub fn new(inner: R, signals: SignalController) -> Self {
        Self { inner, signals }
    }
}

impl<R: Read> Read for SignalAwareReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            // Narrows the window in which a shutdown signal lands just before
            // a blocking read; one landing inside read(2) is seen via EINTR.
            if !self.signals.running() {
                return Ok(0);
            }
            match self.inner.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    log::debug!("read interrupted by a signal");
                }
                other => return other,
            }
        }
    }
}
