use log::debug;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

extern "C" fn on_interactive_signal(_: libc::c_int) {}

/// Keeps Ctrl-C and Ctrl-\ from killing the shell itself.
///
/// A caught signal is reset to its default action by `exec`, so children
/// still get the usual behaviour. SA_RESTART keeps a pending terminal read
/// from failing with EINTR.
pub fn ignore_interactive_signals() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_interactive_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    for signal in [Signal::SIGINT, Signal::SIGQUIT] {
        // SAFETY: the handler is a no-op and touches no shared state.
        unsafe { sigaction(signal, &action) }?;
    }
    debug!("interactive signal handlers installed");
    Ok(())
}
