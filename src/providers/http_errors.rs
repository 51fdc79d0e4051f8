use std::error::Error as StdError;
use std::io::ErrorKind;

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::ConnectionRefused
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::TimedOut
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("timed out")
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn connect_failure_message(api_url: &str, refused: bool) -> String {
    if refused {
        format!(
            "request failed: connection refused by '{}'. \
             Ensure the API is reachable and --base-url is correct",
            api_url
        )
    } else {
        format!(
            "failed to connect to '{}'. \
             Check --base-url and network connectivity",
            api_url
        )
    }
}

/// Wraps a send failure with an actionable message. The reqwest error stays
/// in the chain as the source.
pub(crate) fn request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: Option<u64>,
) -> anyhow::Error {
    let message = if err.is_builder() {
        format!("failed to create request for '{}'", api_url)
    } else if err.is_timeout() || error_chain_has_timeout(&err) {
        match timeout_secs {
            Some(secs) => format!(
                "request timed out after {}s while calling '{}'. \
                 Increase REQUEST_TIMEOUT_SECS or check the API's responsiveness",
                secs, api_url
            ),
            None => format!("request timed out while calling '{}'", api_url),
        }
    } else if err.is_connect() {
        connect_failure_message(api_url, error_chain_has_connection_refused(&err))
    } else {
        format!("request failed while calling '{}'", api_url)
    };

    anyhow::Error::new(err).context(message)
}

#[cfg(test)]
mod tests {
    use super::{
        connect_failure_message, error_chain_has_connection_refused, error_chain_has_timeout,
        request_error,
    };
    use reqwest::Client;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    fn free_local_addr() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = listener.local_addr().expect("address should be available");
        drop(listener);
        addr
    }

    #[tokio::test]
    async fn maps_connection_refused_errors_to_actionable_message() {
        let addr = free_local_addr();
        let api_url = format!("http://{}/chat/completions", addr);
        let client = Client::builder()
            .timeout(Duration::from_millis(300))
            .build()
            .expect("client should build");

        let req_err = client
            .post(&api_url)
            .send()
            .await
            .expect_err("request should fail with connection-refused");
        let mapped = request_error(req_err, &api_url, Some(1));
        let msg = format!("{mapped:#}");

        assert!(msg.contains("connection refused"), "unexpected message: {msg}");
        assert!(msg.contains("--base-url"), "unexpected message: {msg}");
        assert!(
            mapped.downcast_ref::<reqwest::Error>().is_some(),
            "reqwest error should stay in the chain"
        );
    }

    #[tokio::test]
    async fn maps_timeout_errors_to_actionable_message() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = listener.local_addr().expect("address should be available");
        let server = thread::spawn(move || {
            let (_stream, _) = listener.accept().expect("accept should succeed");
            thread::sleep(Duration::from_secs(1));
        });

        let api_url = format!("http://{}/chat/completions", addr);
        let client = Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("client should build");

        let req_err = client
            .post(&api_url)
            .send()
            .await
            .expect_err("request should fail with timeout");
        let mapped = request_error(req_err, &api_url, Some(2));
        let msg = format!("{mapped:#}");

        assert!(
            msg.contains("request timed out after 2s"),
            "unexpected message: {msg}"
        );
        assert!(
            msg.contains("REQUEST_TIMEOUT_SECS"),
            "unexpected message: {msg}"
        );

        server.join().expect("server thread should join");
    }

    #[tokio::test]
    async fn maps_malformed_urls_to_request_construction_errors() {
        let client = Client::new();
        let api_url = "not a url/chat/completions";

        let req_err = client
            .post(api_url)
            .send()
            .await
            .expect_err("malformed url should fail");
        let mapped = request_error(req_err, api_url, None);

        assert!(
            mapped.to_string().starts_with("failed to create request"),
            "unexpected message: {mapped:#}"
        );
    }

    #[test]
    fn detects_timeout_from_error_kind() {
        let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        assert!(error_chain_has_timeout(&err));
    }

    #[test]
    fn detects_connection_refused_from_error_kind() {
        let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "nope");
        assert!(error_chain_has_connection_refused(&err));
        let other = std::io::Error::other("disk full");
        assert!(!error_chain_has_connection_refused(&other));
    }

    #[test]
    fn connect_failure_message_distinguishes_refused_from_unreachable() {
        let refused = connect_failure_message("http://h/chat/completions", true);
        assert!(
            refused.starts_with("request failed: connection refused by 'http://h/chat/completions'"),
            "unexpected message: {refused}"
        );

        let unreachable = connect_failure_message("http://h/chat/completions", false);
        assert!(
            unreachable.starts_with("failed to connect to 'http://h/chat/completions'"),
            "unexpected message: {unreachable}"
        );
        assert!(unreachable.contains("--base-url"), "unexpected message: {unreachable}");
    }
}
