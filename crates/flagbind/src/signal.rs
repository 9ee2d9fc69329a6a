//! Signal-driven cancellation for context-aware entry points.
//!
//! A [`SignalListener`] owns one background thread running a current-thread
//! tokio runtime. The thread waits for SIGINT or SIGTERM (Ctrl-C on Windows)
//! or for the dispatched context to be cancelled, whichever comes first. A
//! signal cancels the context and re-arms the default disposition, so the
//! next signal terminates the process.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;

static ACTIVE: AtomicUsize = AtomicUsize::new(0);

/// Number of signal listeners currently installed in this process.
pub fn active_signal_listeners() -> usize {
    ACTIVE.load(Ordering::SeqCst)
}

/// Background listener bound to one dispatched context.
///
/// Dropping it stops the thread and waits for it to exit.
pub(crate) struct SignalListener {
    ctx: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SignalListener {
    pub(crate) fn spawn(ctx: &CancellationToken) -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        // The streams must exist before spawn returns.
        let signals = {
            let _entered = runtime.enter();
            Signals::new()?
        };
        if let Err(err) = rearm::disarm() {
            tracing::warn!(%err, "cannot emulate default signal disposition");
        }

        let token = ctx.clone();
        let spawned = std::thread::Builder::new()
            .name("flagbind-signal".into())
            .spawn(move || listen(runtime, signals, token));
        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                rearm::arm();
                return Err(err);
            }
        };

        ACTIVE.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("signal listener started");
        Ok(Self {
            ctx: ctx.clone(),
            handle: Some(handle),
        })
    }
}

fn listen(runtime: Runtime, mut signals: Signals, ctx: CancellationToken) {
    runtime.block_on(async {
        tokio::select! {
            _ = ctx.cancelled() => {}
            signal = signals.recv() => {
                tracing::debug!(signal, "received signal, cancelling");
                rearm::arm();
                ctx.cancel();
            }
        }
    });
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        self.ctx.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("signal listener thread panicked");
            }
        }
        rearm::arm();
        ACTIVE.fetch_sub(1, Ordering::SeqCst);
        tracing::debug!("signal listener stopped");
    }
}

#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn new() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }
}

#[cfg(windows)]
struct Signals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl Signals {
    fn new() -> io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        self.ctrl_c.recv().await;
        "CTRL_C"
    }
}

/// Default-disposition emulation for SIGINT and SIGTERM.
///
/// tokio keeps its handlers installed for the life of the process. While the
/// flag is set, signal-hook runs the default action next to them, which is
/// what a process without a listener would see.
#[cfg(unix)]
mod rearm {
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use once_cell::sync::OnceCell;
    use signal_hook::consts::{SIGINT, SIGTERM};

    static FLAG: OnceCell<Arc<AtomicBool>> = OnceCell::new();

    fn flag() -> io::Result<&'static Arc<AtomicBool>> {
        FLAG.get_or_try_init(|| {
            let flag = Arc::new(AtomicBool::new(true));
            for signal in [SIGINT, SIGTERM] {
                signal_hook::flag::register_conditional_default(signal, Arc::clone(&flag))?;
            }
            Ok(flag)
        })
    }

    pub(super) fn disarm() -> io::Result<()> {
        flag()?.store(false, Ordering::SeqCst);
        Ok(())
    }

    pub(super) fn arm() {
        if let Some(flag) = FLAG.get() {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(not(unix))]
mod rearm {
    pub(super) fn disarm() -> std::io::Result<()> {
        Ok(())
    }

    pub(super) fn arm() {}
}
