//! Interrupt handling for interactive commands

use colored::Colorize;
use tokio::sync::mpsc;

/// Why the process was asked to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// SIGINT / Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
}

/// Receives OS shutdown signals.
///
/// Recording and playback treat an interrupt like a stop request so the
/// current recording is still saved.
pub struct InterruptSignal {
    receiver: mpsc::Receiver<Interrupt>,
}

impl InterruptSignal {
    /// Start listening for SIGINT (and SIGTERM on unix)
    pub fn listen() -> Result<Self, std::io::Error> {
        let (tx, rx) = mpsc::channel(4);

        let tx_int = tx.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                eprintln!();
                eprintln!("{} Received interrupt, stopping", "↓".cyan());
                if tx_int.send(Interrupt::Interrupt).await.is_err() {
                    break;
                }
            }
        });

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate())?;
            tokio::spawn(async move {
                while sigterm.recv().await.is_some() {
                    if tx.send(Interrupt::Terminate).await.is_err() {
                        break;
                    }
                }
            });
        }

        Ok(Self { receiver: rx })
    }

    /// Wait for the next signal
    pub async fn recv(&mut self) -> Option<Interrupt> {
        self.receiver.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_equality() {
        assert_eq!(Interrupt::Interrupt, Interrupt::Interrupt);
        assert_ne!(Interrupt::Interrupt, Interrupt::Terminate);
    }

    #[tokio::test]
    async fn listen_installs_handlers() {
        assert!(InterruptSignal::listen().is_ok());
    }
}
