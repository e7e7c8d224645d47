//! Consent surfaces and the signals they deliver.
//!
//! A consent surface shows the provider's authorization page and reports back
//! through a per-attempt channel. The importer honours the first decisive
//! signal and then drops its receiver, so duplicates and stragglers are
//! rejected at the sender.

use reqwest::Url;
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::Result;
use crate::token::ImportToken;

/// A message from a consent surface.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsentSignal {
    /// Access token, already exchanged by the intermediary
    Token(ImportToken),
    /// Authorization code still to be exchanged
    Code(String),
    /// The provider or intermediary reported an error
    Error(String),
    /// Anything else arriving on the channel; ignored
    Unrecognized(String),
}

impl ConsentSignal {
    /// Token, code and error signals settle the wait; anything else does not.
    pub fn is_decisive(&self) -> bool {
        !matches!(self, ConsentSignal::Unrecognized(_))
    }

    /// Interpret text pasted back from the consent page.
    ///
    /// Accepts a full callback URL carrying `code`, `error` or `token` in its
    /// query or fragment, a bare query string such as `code=abc&state=xyz`, or
    /// a bare authorization code. Values are percent-decoded.
    pub fn parse(input: &str) -> Option<ConsentSignal> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let pairs = if input.contains("://") {
            match Url::parse(input) {
                Ok(url) => {
                    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
                    if let Some(fragment) = url.fragment() {
                        pairs.extend(query_pairs(fragment));
                    }
                    pairs
                }
                Err(_) => return Some(ConsentSignal::Unrecognized(input.to_string())),
            }
        } else if input.contains('=') {
            query_pairs(input.trim_start_matches(['?', '#']))
        } else if input.contains(char::is_whitespace) {
            return Some(ConsentSignal::Unrecognized(input.to_string()));
        } else {
            return Some(ConsentSignal::Code(input.to_string()));
        };

        let mut code = None;
        for (key, value) in pairs {
            match key.as_str() {
                "error" => return Some(ConsentSignal::Error(value)),
                "token" => return Some(ConsentSignal::Token(ImportToken::new(value))),
                "code" if code.is_none() && !value.is_empty() => code = Some(value),
                _ => {}
            }
        }

        match code {
            Some(code) => Some(ConsentSignal::Code(code)),
            None => Some(ConsentSignal::Unrecognized(input.to_string())),
        }
    }
}

/// Decoded `key=value` pairs of a query string without its leading `?`.
fn query_pairs(query: &str) -> Vec<(String, String)> {
    Url::parse(&format!("http://localhost/?{}", query))
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default()
}

/// How a consent wait ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsentOutcome {
    /// Token received
    Token(ImportToken),
    /// Code received
    Code(String),
    /// Error received
    Error(String),
    /// Every sender went away without a decisive signal
    Closed,
}

/// Sending half held by the consent surface. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ConsentSender {
    tx: mpsc::UnboundedSender<ConsentSignal>,
}

impl ConsentSender {
    /// Deliver a signal. Returns `false` if the attempt no longer listens.
    pub fn send(&self, signal: ConsentSignal) -> bool {
        self.tx.send(signal).is_ok()
    }

    /// Whether the attempt still listens.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Receiving half owned by one import attempt.
#[derive(Debug)]
pub struct ConsentWait {
    rx: mpsc::UnboundedReceiver<ConsentSignal>,
}

impl ConsentWait {
    /// A fresh channel for one attempt.
    pub fn channel() -> (ConsentSender, ConsentWait) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConsentSender { tx }, ConsentWait { rx })
    }

    /// Wait for the first decisive signal. Consumes the wait, closing the channel.
    pub async fn decisive(mut self) -> ConsentOutcome {
        while let Some(signal) = self.rx.recv().await {
            match signal {
                ConsentSignal::Token(token) => return ConsentOutcome::Token(token),
                ConsentSignal::Code(code) => return ConsentOutcome::Code(code),
                ConsentSignal::Error(message) => return ConsentOutcome::Error(message),
                ConsentSignal::Unrecognized(raw) => {
                    warn!("Ignoring unrecognized consent message ({} bytes)", raw.len());
                }
            }
        }
        ConsentOutcome::Closed
    }
}

/// Something that can show an authorization URL to the user.
pub trait ConsentSurface: Send + Sync {
    /// Present `url`. Fails with [`ImportError::ConsentSurfaceBlocked`](crate::ImportError::ConsentSurfaceBlocked)
    /// when the surface cannot be shown.
    fn open(&self, url: &str) -> Result<ConsentWait>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_decisive_signal_wins() {
        let (tx, wait) = ConsentWait::channel();
        assert!(tx.send(ConsentSignal::Unrecognized("hello".to_string())));
        assert!(tx.send(ConsentSignal::Error("access_denied".to_string())));
        assert!(tx.send(ConsentSignal::Token(ImportToken::new("late"))));

        assert_eq!(wait.decisive().await, ConsentOutcome::Error("access_denied".to_string()));
        assert!(!tx.is_open());
        assert!(!tx.send(ConsentSignal::Token(ImportToken::new("later"))));
    }

    #[tokio::test]
    async fn test_dropped_senders_close_the_wait() {
        let (tx, wait) = ConsentWait::channel();
        let duplicate = tx.clone();
        drop(tx);
        drop(duplicate);
        assert_eq!(wait.decisive().await, ConsentOutcome::Closed);
    }

    #[test]
    fn test_parse_callback_urls() {
        assert_eq!(
            ConsentSignal::parse("https://example.com/cb?code=abc123&state=xyz"),
            Some(ConsentSignal::Code("abc123".to_string()))
        );
        assert_eq!(
            ConsentSignal::parse("https://example.com/cb?state=xyz&error=access_denied"),
            Some(ConsentSignal::Error("access_denied".to_string()))
        );
        assert_eq!(
            ConsentSignal::parse("https://example.com/done#token=t0k"),
            Some(ConsentSignal::Token(ImportToken::new("t0k")))
        );
    }

    #[test]
    fn test_parse_decodes_values() {
        assert_eq!(
            ConsentSignal::parse("https://cb.example/?error=access%20denied&state=x"),
            Some(ConsentSignal::Error("access denied".to_string()))
        );
        assert_eq!(
            ConsentSignal::parse("https://cb.example/?code=a%2Bb"),
            Some(ConsentSignal::Code("a+b".to_string()))
        );
    }

    #[test]
    fn test_parse_bare_query_string() {
        assert_eq!(
            ConsentSignal::parse("code=abc123&state=xyz"),
            Some(ConsentSignal::Code("abc123".to_string()))
        );
        assert_eq!(
            ConsentSignal::parse("?state=xyz&error=access_denied"),
            Some(ConsentSignal::Error("access_denied".to_string()))
        );
        assert!(matches!(
            ConsentSignal::parse("state=xyz"),
            Some(ConsentSignal::Unrecognized(_))
        ));
    }

    #[test]
    fn test_parse_bare_and_empty() {
        assert_eq!(ConsentSignal::parse("  abc123 \n"), Some(ConsentSignal::Code("abc123".to_string())));
        assert_eq!(ConsentSignal::parse("   "), None);
        assert!(matches!(
            ConsentSignal::parse("https://example.com/nothing"),
            Some(ConsentSignal::Unrecognized(_))
        ));
    }
}
