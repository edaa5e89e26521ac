//! TCP feed reader with automatic reconnection.
//!
//! Connects to an NMEA-over-TCP source (a receiver, `aiscatcher`, an
//! aggregator), decodes each line on the reading task and reconnects after a
//! fixed delay when the peer goes away. Cancellation is honoured between
//! lines and during the reconnect wait.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use ais_core::{MessageHandler, NmeaDecoder};

/// Where to connect and how long to wait between attempts.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Server address in "host:port" format.
    pub address: String,
    pub reconnect_delay: Duration,
}

impl FeedConfig {
    pub fn new(host: &str, port: u16, reconnect_delay: Duration) -> Self {
        FeedConfig {
            address: format!("{host}:{port}"),
            reconnect_delay,
        }
    }
}

enum ReconnectReason {
    ConnectionClosed,
    Cancelled,
}

/// Read the feed until `cancel` fires. Returns the number of successful
/// connections made.
///
/// Incomplete multi-part messages are dropped on every reconnect; a
/// fragment set never spans two connections.
pub async fn run_feed<H>(
    config: &FeedConfig,
    decoder: &mut NmeaDecoder,
    cancel: &CancellationToken,
    handler: &mut H,
) -> u32
where
    H: MessageHandler + ?Sized,
{
    let mut connections = 0u32;

    loop {
        if cancel.is_cancelled() {
            info!("feed cancelled");
            return connections;
        }

        info!(address = %config.address, "connecting");

        match connect_and_process(&config.address, decoder, cancel, handler, &mut connections)
            .await
        {
            Ok(ReconnectReason::ConnectionClosed) => {
                info!(address = %config.address, "connection closed");
            }
            Ok(ReconnectReason::Cancelled) => {
                info!("feed cancelled");
                return connections;
            }
            Err(e) => {
                error!(address = %config.address, error = %e, "connection error");
            }
        }

        decoder.reset_fragments();
        warn!(
            delay_secs = config.reconnect_delay.as_secs_f64(),
            "reconnecting"
        );

        tokio::select! {
            () = sleep(config.reconnect_delay) => {}
            () = cancel.cancelled() => {
                info!("feed cancelled during reconnect delay");
                return connections;
            }
        }
    }
}

async fn connect_and_process<H>(
    address: &str,
    decoder: &mut NmeaDecoder,
    cancel: &CancellationToken,
    handler: &mut H,
    connections: &mut u32,
) -> std::io::Result<ReconnectReason>
where
    H: MessageHandler + ?Sized,
{
    let stream = tokio::select! {
        result = TcpStream::connect(address) => result?,
        () = cancel.cancelled() => return Ok(ReconnectReason::Cancelled),
    };
    *connections += 1;
    info!(address, "connected");

    let mut lines = BufReader::new(stream).lines();

    loop {
        if cancel.is_cancelled() {
            return Ok(ReconnectReason::Cancelled);
        }

        tokio::select! {
            line_result = lines.next_line() => {
                match line_result? {
                    Some(line) => handle_line(&line, decoder, handler),
                    None => return Ok(ReconnectReason::ConnectionClosed),
                }
            }
            () = cancel.cancelled() => {
                return Ok(ReconnectReason::Cancelled);
            }
        }
    }
}

fn handle_line<H>(line: &str, decoder: &mut NmeaDecoder, handler: &mut H)
where
    H: MessageHandler + ?Sized,
{
    let Some(line) = crate::capture::clean_line(line) else {
        return;
    };

    match decoder.decode_line(line) {
        Ok(Some(msg)) => handler.on_message(msg),
        Ok(None) => debug!(line, "fragment buffered"),
        Err(err) => {
            warn!(kind = err.kind(), error = %err, line, "dropping line");
            handler.on_error(line, &err);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ais_core::DecodedMsg;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    const POSITION: &str = "!AIVDM,1,1,,A,13aEOK?P00PD2wVMdLDRcQv40PSh,0*34";
    const VOYAGE_1: &str =
        "!AIVDM,2,1,1,A,55?MbV02;H;s<HtKR20EHE:0@T4@Dn2222222216L961O5Gf0NSQEp6ClRp8,0*1C";
    const VOYAGE_2: &str = "!AIVDM,2,2,1,A,88888888880,2*25";

    #[tokio::test]
    async fn test_feed_decodes_and_cancels() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let payload = format!("{POSITION}\r\ngarbage\r\n\r\n{VOYAGE_1}\r\n{VOYAGE_2}\r\n");
            socket.write_all(payload.as_bytes()).await.unwrap();
            // Hold the connection open until the client hangs up.
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let config = FeedConfig::new("127.0.0.1", port, Duration::from_millis(50));
        let cancel = CancellationToken::new();
        let mut decoder = NmeaDecoder::new();
        let mut got: Vec<DecodedMsg> = Vec::new();

        let token = cancel.clone();
        let mut handler = |msg: DecodedMsg| {
            got.push(msg);
            if got.len() == 2 {
                token.cancel();
            }
        };

        let connections = tokio::time::timeout(
            Duration::from_secs(5),
            run_feed(&config, &mut decoder, &cancel, &mut handler),
        )
        .await
        .unwrap();

        assert_eq!(connections, 1);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].mmsi().value(), 244670316);
        assert_eq!(got[1].mmsi().value(), 351759000);
        assert_eq!(decoder.stats().error_count("malformed"), 1);
    }

    #[tokio::test]
    async fn test_feed_reconnects_after_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            for _ in 0..2 {
                let (mut socket, _) = listener.accept().await.unwrap();
                socket
                    .write_all(format!("{POSITION}\n").as_bytes())
                    .await
                    .unwrap();
                // Dropping the socket closes the connection.
            }
        });

        let config = FeedConfig::new("127.0.0.1", port, Duration::from_millis(20));
        let cancel = CancellationToken::new();
        let mut decoder = NmeaDecoder::new();
        let mut count = 0;

        let token = cancel.clone();
        let mut handler = |_msg: DecodedMsg| {
            count += 1;
            if count == 2 {
                token.cancel();
            }
        };

        let connections = tokio::time::timeout(
            Duration::from_secs(5),
            run_feed(&config, &mut decoder, &cancel, &mut handler),
        )
        .await
        .unwrap();

        assert_eq!(connections, 2);
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_fragments_dropped_on_reconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut first, _) = listener.accept().await.unwrap();
            first
                .write_all(format!("{VOYAGE_1}\n").as_bytes())
                .await
                .unwrap();
            drop(first);

            let (mut second, _) = listener.accept().await.unwrap();
            second
                .write_all(format!("{VOYAGE_2}\n{POSITION}\n").as_bytes())
                .await
                .unwrap();
        });

        let config = FeedConfig::new("127.0.0.1", port, Duration::from_millis(20));
        let cancel = CancellationToken::new();
        let mut decoder = NmeaDecoder::new();
        let mut got: Vec<DecodedMsg> = Vec::new();

        let token = cancel.clone();
        let mut handler = |msg: DecodedMsg| {
            got.push(msg);
            token.cancel();
        };

        tokio::time::timeout(
            Duration::from_secs(5),
            run_feed(&config, &mut decoder, &cancel, &mut handler),
        )
        .await
        .unwrap();

        // The orphaned second fragment starts a new set that never completes.
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].mmsi().value(), 244670316);
    }

    #[tokio::test]
    async fn test_cancel_during_reconnect_delay() {
        // Bind then drop to get a port nobody is listening on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let config = FeedConfig::new("127.0.0.1", port, Duration::from_secs(60));
        let cancel = CancellationToken::new();
        let mut decoder = NmeaDecoder::new();
        let mut handler = |_msg: DecodedMsg| {};

        let token = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let connections = tokio::time::timeout(
            Duration::from_secs(5),
            run_feed(&config, &mut decoder, &cancel, &mut handler),
        )
        .await
        .unwrap();

        assert_eq!(connections, 0);
    }

    #[tokio::test]
    async fn test_precancelled_never_connects() {
        let config = FeedConfig::new("127.0.0.1", 9, Duration::from_secs(60));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut decoder = NmeaDecoder::new();
        let mut handler = |_msg: DecodedMsg| {};

        let connections = run_feed(&config, &mut decoder, &cancel, &mut handler).await;
        assert_eq!(connections, 0);
        assert_eq!(decoder.stats().lines, 0);
    }
}
