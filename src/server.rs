use std::io;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tracing::{error, warn};

/// Bind `host:port`, moving on to the next port while the current one is taken.
/// Any other bind failure is returned to the caller.
pub async fn bind_with_fallback(host: IpAddr, port: u16) -> io::Result<TcpListener> {
    let mut port = port;
    loop {
        match TcpListener::bind(SocketAddr::new(host, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                let Some(next) = port.checked_add(1) else {
                    error!("Port {} is busy and no higher port is left", port);
                    return Err(e);
                };
                warn!("Port {} is busy. Trying {}...", port, next);
                port = next;
            }
            Err(e) => {
                error!("Server failed to start: {}", e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn busy_port_moves_to_a_later_one() {
        let host = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let taken = TcpListener::bind(SocketAddr::new(host, 0))
            .await
            .expect("bind ephemeral");
        let taken_port = taken.local_addr().expect("local addr").port();

        let listener = bind_with_fallback(host, taken_port)
            .await
            .expect("fallback bind");
        let port = listener.local_addr().expect("local addr").port();
        assert!(port > taken_port);
    }
}
