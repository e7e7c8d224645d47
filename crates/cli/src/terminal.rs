//! Consent surface for an interactive terminal.

use fitlog_import::{ConsentSender, ConsentSignal, ConsentSurface, ConsentWait, ImportError};
use std::io::{BufRead, IsTerminal};
use tracing::debug;

/// Prints the authorization URL and reads the callback back from stdin.
///
/// The user pastes the URL the browser landed on (or the bare code). An empty
/// line or end of input closes the surface.
pub struct TerminalSurface;

impl ConsentSurface for TerminalSurface {
    fn open(&self, url: &str) -> fitlog_import::Result<ConsentWait> {
        if !std::io::stdin().is_terminal() {
            return Err(ImportError::ConsentSurfaceBlocked(
                "stdin is not an interactive terminal".to_string(),
            ));
        }

        let (tx, wait) = ConsentWait::channel();

        println!("Open this link to authorize access to your Withings data:");
        println!();
        println!("  {}", url);
        println!();
        println!("Then paste the address you were redirected to (empty line to cancel):");

        // A blocked read only notices a timed-out or superseded attempt once the
        // next line arrives; the binary exits before that matters.
        std::thread::spawn(move || {
            relay(std::io::stdin().lock().lines(), &tx);
            debug!("Terminal consent reader finished");
        });

        Ok(wait)
    }
}

/// Forward pasted lines to the attempt until a decisive signal, an empty line,
/// end of input, or the attempt no longer listening.
fn relay(lines: impl Iterator<Item = std::io::Result<String>>, tx: &ConsentSender) {
    for line in lines {
        if !tx.is_open() {
            break;
        }
        let Ok(line) = line else { break };
        let Some(signal) = ConsentSignal::parse(&line) else { break };
        let decisive = signal.is_decisive();
        if !tx.send(signal) || decisive {
            break;
        }
        eprintln!("Could not find a code in that input, try again.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitlog_import::ConsentOutcome;

    fn lines(input: &[&str]) -> Vec<std::io::Result<String>> {
        input.iter().map(|l| Ok(l.to_string())).collect()
    }

    #[tokio::test]
    async fn test_relay_stops_at_first_decisive_line() {
        let (tx, wait) = ConsentWait::channel();
        let mut input = lines(&["hello there", "https://cb.example/?code=abc", "code=late"]).into_iter();

        relay(input.by_ref(), &tx);
        drop(tx);

        assert_eq!(wait.decisive().await, ConsentOutcome::Code("abc".to_string()));
        assert_eq!(input.count(), 1);
    }

    #[tokio::test]
    async fn test_relay_empty_line_closes() {
        let (tx, wait) = ConsentWait::channel();
        relay(lines(&["", "code=abc"]).into_iter(), &tx);
        drop(tx);

        assert_eq!(wait.decisive().await, ConsentOutcome::Closed);
    }

    #[test]
    fn test_relay_stops_when_attempt_is_gone() {
        let (tx, wait) = ConsentWait::channel();
        drop(wait);
        let mut input = lines(&["https://cb.example/?code=abc", "code=def"]).into_iter();

        relay(input.by_ref(), &tx);

        assert_eq!(input.count(), 1);
    }
}
