//! Keeps SIGINT from killing the interpreter.
//!
//! The OS-level handler installed by `signal-hook` only records the signal. A
//! bridge thread picks it up, flushes stdout and forwards it over a channel
//! that the evaluator drains between lines. The handler stays installed for
//! the lifetime of the [`SignalManager`], so every delivery is handled the
//! same way. Programs we spawn get the default disposition back on exec.

use anyhow::{Context, Result};
use signal_hook::consts::SIGINT;
use signal_hook::iterator::{Handle, Signals};
use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Installed SIGINT handler plus the bridge thread that reports its deliveries.
pub struct SignalManager {
    handle: Handle,
    interrupts: Receiver<i32>,
    bridge: Option<JoinHandle<()>>,
}

impl SignalManager {
    /// Installs the SIGINT handler and starts the bridge thread.
    pub fn install() -> Result<Self> {
        let mut signals = Signals::new([SIGINT]).context("failed to install SIGINT handler")?;
        let handle = signals.handle();
        let (tx, rx) = mpsc::channel();

        let bridge = thread::Builder::new()
            .name("sigint-bridge".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    let _ = io::stdout().flush();
                    if tx.send(signal).is_err() {
                        break;
                    }
                }
            })
            .context("failed to start signal bridge thread")?;

        log::debug!("SIGINT handler armed");
        Ok(Self {
            handle,
            interrupts: rx,
            bridge: Some(bridge),
        })
    }

    /// Number of interrupts delivered since the last call.
    pub fn take_interrupts(&self) -> usize {
        self.interrupts.try_iter().count()
    }
}

impl Drop for SignalManager {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(bridge) = self.bridge.take() {
            let _ = bridge.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_hook::low_level::raise;
    use std::time::{Duration, Instant};

    fn wait_for_interrupts(manager: &SignalManager, expected: usize) -> usize {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = 0;
        while seen < expected && Instant::now() < deadline {
            seen += manager.take_interrupts();
            thread::sleep(Duration::from_millis(5));
        }
        seen
    }

    #[test]
    fn test_interrupt_is_recorded_not_fatal() {
        let manager = SignalManager::install().unwrap();
        raise(SIGINT).unwrap();
        assert!(wait_for_interrupts(&manager, 1) >= 1);
    }

    #[test]
    fn test_handler_stays_armed_after_repeated_interrupts() {
        let manager = SignalManager::install().unwrap();
        for _ in 0..3 {
            raise(SIGINT).unwrap();
            assert!(wait_for_interrupts(&manager, 1) >= 1);
        }
    }

    #[test]
    fn test_drop_stops_bridge() {
        let manager = SignalManager::install().unwrap();
        drop(manager);
    }
}
