//! Connection establishment
//!
//! Opens the TCP transport and performs the challenge-response login.  A
//! `Connection` is only handed out once it is fully authenticated; a
//! failure at any point of the handshake tears the socket down rather than
//! leaving it half-open.

use std::io::{BufReader, BufWriter, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use crate::config::{AddressFamily, Config};
use crate::error::{ClientError, Result};
use crate::protocol::codec::write_line;
use crate::protocol::{from_hex, quote, read_response, DigestAlgorithm};

/// An authenticated connection to the server
pub struct Connection {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    peer_addr: String,
}

impl Connection {
    /// Connect and authenticate.
    pub fn open(config: &Config) -> Result<Self> {
        let stream = Self::connect(config)?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        let mut conn = Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
        };
        conn.authenticate(config)?;
        tracing::debug!("connected and authenticated to {}", conn.peer_addr);
        Ok(conn)
    }

    /// Open a TCP stream honoring the address family preference.
    fn connect(config: &Config) -> Result<TcpStream> {
        let wanted = |addr: &SocketAddr| match config.address_family {
            AddressFamily::Any => true,
            AddressFamily::Ipv4 => addr.is_ipv4(),
            AddressFamily::Ipv6 => addr.is_ipv6(),
        };
        let mut last_error = None;
        for addr in (config.host.as_str(), config.port).to_socket_addrs()? {
            if !wanted(&addr) {
                continue;
            }
            match TcpStream::connect(addr) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = Some(e),
            }
        }
        Err(ClientError::Io(last_error.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                format!("no usable address for {}", config.host),
            )
        })))
    }

    /// Field the greeting and log in.
    ///
    /// The greeting has the shape `231 2 <algorithm> <challenge-hex>`; the
    /// login digest is `hash(password ++ challenge)` sent as
    /// `user <name> <digest-hex>`.
    fn authenticate(&mut self, config: &Config) -> Result<()> {
        let greeting = read_response(&mut self.reader)?;
        if greeting.code != 231 {
            return Err(ClientError::Protocol(greeting.line));
        }
        let digest = match greeting.fields()? {
            [_, generation, algorithm, challenge] => {
                if generation != "2" {
                    return Err(ClientError::Parse(format!(
                        "unknown protocol generation: {}",
                        generation
                    )));
                }
                DigestAlgorithm::from_name(algorithm)?
                    .respond(&config.password, &from_hex(challenge)?)
            }
            _ => {
                return Err(ClientError::Parse(format!(
                    "malformed greeting: {}",
                    greeting.line
                )))
            }
        };
        write_line(
            &mut self.writer,
            &format!("user {} {}", quote(&config.username), digest),
        )?;
        self.writer.flush()?;
        let reply = read_response(&mut self.reader)?;
        if !reply.is_success() {
            return Err(ClientError::Protocol(format!(
                "authentication failed: {}",
                reply.line
            )));
        }
        Ok(())
    }

    /// Split into the receive and send halves guarded by their respective
    /// locks.
    pub fn into_split(self) -> (BufReader<TcpStream>, BufWriter<TcpStream>) {
        (self.reader, self.writer)
    }

    /// The peer address, for logging.
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
